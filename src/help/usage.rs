//! Help for the whole tool.

use crate::cli::Args;
use crate::help::schema::describe_all;
use crate::plugin::{PluginKind, PluginRegistry};
use clap::CommandFactory;
use serde_json::{json, Value};
use std::fmt::Write as _;

/// Version of the structured help layout.
pub const SCHEMA_VERSION: &str = "1";

/// Command line usage followed by every registered plugin.
pub fn general_text(registry: &PluginRegistry) -> String {
    let mut out = Args::command().render_help().to_string();

    for (title, kind) in [
        ("Inputs", PluginKind::Input),
        ("Filters", PluginKind::Filter),
        ("Outputs", PluginKind::Output),
        ("Customs", PluginKind::Custom),
    ] {
        let descriptors = registry.descriptors(kind);
        if descriptors.is_empty() {
            continue;
        }

        let _ = writeln!(out, "\n{title}");
        let width = descriptors.iter().map(|d| d.name.len()).max().unwrap_or(0) + 2;
        for descriptor in descriptors {
            let _ = writeln!(
                out,
                "  {:<width$}{}",
                descriptor.name, descriptor.description
            );
        }
    }
    out
}

/// Schema of every registered plugin, plus tool metadata.
pub fn general_json(registry: &PluginRegistry) -> Result<Value, serde_json::Error> {
    Ok(json!({
        "fluxbit": {
            "version": env!("CARGO_PKG_VERSION"),
            "schema_version": SCHEMA_VERSION,
            "os": std::env::consts::OS,
        },
        "customs": serde_json::to_value(describe_all(registry, PluginKind::Custom))?,
        "inputs": serde_json::to_value(describe_all(registry, PluginKind::Input))?,
        "filters": serde_json::to_value(describe_all(registry, PluginKind::Filter))?,
        "outputs": serde_json::to_value(describe_all(registry, PluginKind::Output))?,
    }))
}
