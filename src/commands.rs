use crate::cli::{HelpFormat, HelpRequest};
use crate::config::{self, ConfigTree};
use crate::engine::{self, install_handlers, EngineState, SignalFlags, Topology, Watcher};
use crate::error::Result;
use crate::help;
use crate::state::AppState;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// How often the running phase checks for signals.
pub const WATCH_INTERVAL: Duration = Duration::from_secs(1);

/// Renders the help output asked for on the command line.
pub fn render_help(request: &HelpRequest, state: &AppState) -> Result<String> {
    let output = match request {
        HelpRequest::General(HelpFormat::Text) => help::usage::general_text(&state.registry),
        HelpRequest::General(HelpFormat::Json) => {
            let schema = help::usage::general_json(&state.registry)?;
            format!("{}\n", serde_json::to_string(&schema)?)
        }
        HelpRequest::Plugin { kind, name, format } => {
            let doc = help::describe(&state.registry, *kind, name)?;
            match format {
                HelpFormat::Text => help::render_text(&doc),
                HelpFormat::Json => format!("{}\n", help::render_json(&doc)?),
            }
        }
    };
    Ok(output)
}

/// Loads and merges the configuration, validates resource limits and
/// instantiates every plugin.
pub fn prepare(file: Option<&Path>, cli: ConfigTree, state: &mut AppState) -> Result<Topology> {
    if let Some(path) = file {
        info!("Loading configuration from: {}", path.display());
    }

    let tree = config::merge(file, cli, state)?;
    state.service.validate_limits()?;

    let topology = engine::build_topology(&tree, state)?;
    info!(
        instances = topology.len(),
        sections = tree.sections.len(),
        "configuration loaded"
    );
    debug!("{}", topology.dump(&state.service));
    Ok(topology)
}

/// Dry run: everything up to, not including, the running phase.
pub fn run_config_check(file: Option<&Path>, cli: ConfigTree, state: &mut AppState) -> Result<()> {
    state.dry_run = true;
    prepare(file, cli, state)?;
    eprintln!("configuration test is successful");
    Ok(())
}

/// Starts the topology and blocks until a termination signal drains it.
pub async fn run(mut topology: Topology, state: &AppState) -> Result<EngineState> {
    install_handlers()?;
    topology.start();

    let watcher = Watcher::new(SignalFlags::global(), WATCH_INTERVAL);
    let final_state = watcher.run(&mut topology, &state.service).await;
    info!("Shutdown completed");
    Ok(final_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Section;
    use crate::error::FluxError;
    use crate::plugin::PluginKind;

    #[test]
    fn test_plugin_help_renders_requested_format() {
        let state = AppState::default();
        let request = HelpRequest::Plugin {
            kind: PluginKind::Input,
            name: "cpu".into(),
            format: HelpFormat::Json,
        };
        let output = render_help(&request, &state).unwrap();
        assert!(output.starts_with(r#"{"name":"cpu","type":"input""#));

        let request = HelpRequest::Plugin {
            kind: PluginKind::Input,
            name: "cpu".into(),
            format: HelpFormat::Text,
        };
        assert!(render_help(&request, &state).unwrap().starts_with("HELP\ncpu input plugin\n"));
    }

    #[test]
    fn test_help_for_unknown_plugin_fails() {
        let request = HelpRequest::Plugin {
            kind: PluginKind::Output,
            name: "nowhere".into(),
            format: HelpFormat::Text,
        };
        assert!(matches!(
            render_help(&request, &AppState::default()),
            Err(FluxError::Plugin(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_non_positive_flush() {
        let mut cli = ConfigTree::new();
        cli.service_mut().push("flush", "0");
        cli.sections.push(Section::plugin(PluginKind::Input, "cpu"));

        let mut state = AppState::default();
        let err = prepare(None, cli, &mut state).unwrap_err();
        assert!(matches!(err, FluxError::Config(_)));
    }

    #[test]
    fn test_dry_run_builds_topology() {
        let mut cli = ConfigTree::new();
        cli.sections.push(Section::plugin(PluginKind::Input, "cpu"));
        cli.sections.push(Section::plugin(PluginKind::Output, "stdout").with("match", "*"));

        let mut state = AppState::default();
        run_config_check(None, cli, &mut state).unwrap();
        assert!(state.dry_run);
    }
}
