use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

use crate::plugin::PluginKind;

#[derive(Error, Debug)]
pub enum FluxError {
    #[error("Command line error: {0}")]
    Cli(#[from] CliError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Signal setup failed: {0}")]
    Signal(#[from] nix::Error),
}

impl FluxError {
    /// Every fatal error terminates the process with the same failure code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::FAILURE
    }
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Clap(#[from] clap::Error),

    #[error("malformed property '{0}', expected KEY=VALUE")]
    MalformedProperty(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("invalid section '{0}' in the main configuration file")]
    InvalidSection(String),

    #[error(
        "sections 'multiline_parser' and 'parser' are not valid in the main configuration \
         file, found '{0}'; they belong to the parsers_file configuration files"
    )]
    ForbiddenSection(String),

    #[error("could not set config environment variable '{0}'")]
    EnvVar(String),

    #[error("meta command '@{command}' failed: {reason}")]
    Meta { command: String, reason: String },

    #[error("invalid service property '{key}': {reason}")]
    ServiceProperty { key: String, reason: String },

    #[error("resource limit: {0}")]
    ResourceLimit(String),

    #[error("service defaults: {0}")]
    Figment(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Figment(e.to_string())
    }
}

/// Fatal instantiation failures. Property-level problems are reported
/// through [`crate::plugin::PropertyError`] and never abort a pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("section '{kind}' is missing the 'name' property")]
    MissingName { kind: PluginKind },

    #[error("section '{kind}' tried to instance a plugin name that doesn't exist: '{name}'")]
    UnknownPlugin { kind: PluginKind, name: String },
}

pub type Result<T> = std::result::Result<T, FluxError>;
