//! Logging setup.
//!
//! `RUST_LOG` always wins. Otherwise the level comes from the command line
//! (`-v`, `-vv`, `-q`) or, failing that, from `FLUXBIT_LOG_LEVEL`.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "FLUXBIT_LOG_LEVEL";

const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Level implied by the verbosity flags and `env_level`.
pub fn level_for(verbose: u8, quiet: bool, env_level: Option<&str>) -> &'static str {
    if quiet {
        return "off";
    }
    match verbose {
        0 => env_level
            .map(|l| l.trim().to_ascii_lowercase())
            .and_then(|l| LEVELS.iter().find(|known| **known == l).copied())
            .unwrap_or("info"),
        1 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber, logging to stderr. Safe to call twice.
pub fn init_logging(verbose: u8, quiet: bool) {
    let env_level = std::env::var(LOG_LEVEL_ENV).ok();
    let level = level_for(verbose, quiet, env_level.as_deref());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_env_level() {
        assert_eq!(level_for(0, false, None), "info");
        assert_eq!(level_for(0, false, Some("Debug")), "debug");
        assert_eq!(level_for(0, false, Some("chatty")), "info");
        assert_eq!(level_for(1, false, Some("error")), "debug");
        assert_eq!(level_for(3, false, None), "trace");
        assert_eq!(level_for(2, true, None), "off");
    }
}
