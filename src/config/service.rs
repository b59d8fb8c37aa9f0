//! Process-wide service settings.

use crate::config::value::{parse_bool, parse_size};
use crate::error::ConfigError;
use figment::providers::{Env, Serialized};
use figment::Figment;
use nix::unistd::{sysconf, SysconfVar};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix of environment variables that override service defaults.
pub const ENV_PREFIX: &str = "FLUXBIT_";

const BASE_CORO_STACK_SIZE: u64 = 24576;

/// Memory page size of the running system.
pub fn page_size() -> u64 {
    match sysconf(SysconfVar::PAGE_SIZE) {
        Ok(Some(size)) if size > 0 => size as u64,
        _ => 4096,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Flush interval in seconds.
    pub flush: f64,
    /// Seconds to wait for pending work on shutdown.
    pub grace: u64,
    pub daemon: bool,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    pub parsers_file: Vec<PathBuf>,
    pub plugins_file: Option<PathBuf>,
    pub storage_path: Option<PathBuf>,
    pub storage_sync: String,
    pub storage_checksum: bool,
    pub http_server: bool,
    pub http_listen: String,
    pub http_port: u16,
    /// Coroutine stack size in bytes.
    pub coro_stack_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            flush: 1.0,
            grace: 5,
            daemon: false,
            log_file: None,
            log_level: "info".to_string(),
            parsers_file: Vec::new(),
            plugins_file: None,
            storage_path: None,
            storage_sync: "normal".to_string(),
            storage_checksum: false,
            http_server: false,
            http_listen: "0.0.0.0".to_string(),
            http_port: 2020,
            coro_stack_size: BASE_CORO_STACK_SIZE.max(page_size()),
        }
    }
}

impl ServiceConfig {
    /// Built-in defaults overlaid with `FLUXBIT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Figment::from(Serialized::defaults(ServiceConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["parsers_file"]))
            .extract()?;
        Ok(config)
    }

    /// Applies one service property. Returns `Ok(false)` for keys this
    /// configuration does not know.
    pub fn set_property(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        let invalid = |reason: &str| ConfigError::ServiceProperty {
            key: key.to_string(),
            reason: format!("{reason}, got '{value}'"),
        };
        let boolean = || parse_bool(value).ok_or_else(|| invalid("expected a boolean"));
        let value = value.trim();

        match key.to_ascii_lowercase().as_str() {
            "flush" => {
                self.flush = value.parse().map_err(|_| invalid("expected seconds"))?;
            }
            "grace" => {
                self.grace = value.parse().map_err(|_| invalid("expected seconds"))?;
            }
            "daemon" => self.daemon = boolean()?,
            "log_file" => self.log_file = Some(PathBuf::from(value)),
            "log_level" => match value.to_ascii_lowercase().as_str() {
                level @ ("off" | "error" | "warn" | "info" | "debug" | "trace") => {
                    self.log_level = level.to_string();
                }
                _ => return Err(invalid("expected a log level")),
            },
            "parsers_file" => self.parsers_file.push(PathBuf::from(value)),
            "plugins_file" => self.plugins_file = Some(PathBuf::from(value)),
            "storage.path" => self.storage_path = Some(PathBuf::from(value)),
            "storage.sync" => match value.to_ascii_lowercase().as_str() {
                sync @ ("normal" | "full") => self.storage_sync = sync.to_string(),
                _ => return Err(invalid("expected 'normal' or 'full'")),
            },
            "storage.checksum" => self.storage_checksum = boolean()?,
            "http_server" => self.http_server = boolean()?,
            "http_listen" => self.http_listen = value.to_string(),
            "http_port" => {
                self.http_port = value.parse().map_err(|_| invalid("expected a TCP port"))?;
            }
            "coro_stack_size" => {
                self.coro_stack_size = parse_size(value).ok_or_else(|| invalid("expected a size"))?;
            }
            _ => return Ok(false),
        }

        Ok(true)
    }

    /// Checks sizing and timing parameters. Values are never clamped.
    pub fn validate_limits(&self) -> Result<(), ConfigError> {
        let page = page_size();
        if self.coro_stack_size < page {
            return Err(ConfigError::ResourceLimit(format!(
                "coro_stack_size {} is smaller than the page size ({page} bytes)",
                self.coro_stack_size
            )));
        }

        if self.flush <= 0.0 || !self.flush.is_finite() {
            return Err(ConfigError::ResourceLimit(format!(
                "flush interval must be greater than zero, got {}",
                self.flush
            )));
        }

        Ok(())
    }
}
