use crate::config::{Environment, ServiceConfig};
use crate::error::Result;
use crate::plugin::PluginRegistry;
use std::path::PathBuf;

/// Everything the merge, instantiation and help phases read or mutate.
///
/// Passed explicitly to every phase; writers finish before the running
/// phase starts, after which the state is only read.
#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Environment,
    pub service: ServiceConfig,
    pub registry: PluginRegistry,
    /// Directory of the main configuration file, once one is loaded.
    pub root_dir: Option<PathBuf>,
    pub dry_run: bool,
}

impl AppState {
    /// State with built-in plugins and environment-derived service defaults.
    pub fn new() -> Result<Self> {
        Ok(Self::with_registry(
            ServiceConfig::from_env()?,
            PluginRegistry::with_builtins(),
        ))
    }

    pub fn with_registry(service: ServiceConfig, registry: PluginRegistry) -> Self {
        Self {
            env: Environment::new(),
            service,
            registry,
            root_dir: None,
            dry_run: false,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_registry(ServiceConfig::default(), PluginRegistry::with_builtins())
    }
}
