//! Live plugin instances and property assignment.

use crate::config::value::{parse_bool, parse_size, parse_time};
use crate::plugin::descriptor::{Multiplicity, OptionType, PluginDescriptor, PluginKind};
use std::sync::Arc;
use thiserror::Error;

/// A rejected property assignment. Never fatal: the instance stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("unknown property '{key}'")]
    UnknownKey { key: String },

    #[error("invalid value '{value}' for property '{key}', expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("property '{key}' is set more than once")]
    Duplicate { key: String },
}

/// Result of a single `(key, value)` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentOutcome {
    pub key: String,
    pub value: String,
    pub result: Result<(), PropertyError>,
}

impl AssignmentOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Properties every plugin of a kind understands, independent of its
/// own option schema.
fn core_property(kind: PluginKind, key: &str) -> Option<OptionType> {
    let key = key.to_ascii_lowercase();
    match key.as_str() {
        "alias" | "log_level" => return Some(OptionType::String),
        _ => {}
    }

    match (kind, key.as_str()) {
        (PluginKind::Input, "tag") => Some(OptionType::String),
        (PluginKind::Input, "mem_buf_limit") => Some(OptionType::Size),
        (PluginKind::Input, "storage.type") => Some(OptionType::String),
        (PluginKind::Input, "threaded") => Some(OptionType::Boolean),
        (PluginKind::Filter | PluginKind::Output, "match") => Some(OptionType::String),
        (PluginKind::Filter | PluginKind::Output, "match_regex") => Some(OptionType::String),
        (PluginKind::Output, "retry_limit") => Some(OptionType::String),
        (PluginKind::Output, "workers") => Some(OptionType::Integer),
        _ => None,
    }
}

fn check_value(key: &str, value: &str, option_type: OptionType) -> Result<(), PropertyError> {
    let valid = match option_type {
        OptionType::String | OptionType::Clist | OptionType::Slist => true,
        OptionType::Integer => value.trim().parse::<i64>().is_ok(),
        OptionType::Boolean => parse_bool(value).is_some(),
        OptionType::Double => value.trim().parse::<f64>().is_ok(),
        OptionType::Size => parse_size(value).is_some(),
        OptionType::Time => parse_time(value).is_some(),
    };

    if valid {
        Ok(())
    } else {
        Err(PropertyError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: option_type.as_str(),
        })
    }
}

fn check_core_value(key: &str, value: &str) -> Result<(), PropertyError> {
    let invalid = |expected: &'static str| PropertyError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    };

    match key.to_ascii_lowercase().as_str() {
        "log_level" => match value.trim().to_ascii_lowercase().as_str() {
            "off" | "error" | "warn" | "warning" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(invalid("a log level")),
        },
        "storage.type" => match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "filesystem" => Ok(()),
            _ => Err(invalid("'memory' or 'filesystem'")),
        },
        "match_regex" => regex::Regex::new(value)
            .map(|_| ())
            .map_err(|_| invalid("a regular expression")),
        "retry_limit" => {
            let v = value.trim().to_ascii_lowercase();
            if v == "no_limits" || v == "false" || v.parse::<u32>().is_ok() {
                Ok(())
            } else {
                Err(invalid("an integer, 'no_limits' or 'false'"))
            }
        }
        _ => Ok(()),
    }
}

/// A configured plugin object bound to exactly one descriptor.
#[derive(Debug, Clone)]
pub struct PluginInstance {
    id: usize,
    descriptor: Arc<PluginDescriptor>,
    alias: Option<String>,
    properties: Vec<(String, String)>,
    outcomes: Vec<AssignmentOutcome>,
}

impl PluginInstance {
    pub fn new(descriptor: Arc<PluginDescriptor>, id: usize) -> Self {
        Self {
            id,
            descriptor,
            alias: None,
            properties: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> PluginKind {
        self.descriptor.kind
    }

    pub fn plugin_name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    /// Display name: the alias when set, otherwise `plugin.id`.
    pub fn name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => format!("{}.{}", self.descriptor.name, self.id),
        }
    }

    /// Successfully applied properties, in assignment order.
    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    /// Last value applied under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Every value applied under `key`, in order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn outcomes(&self) -> &[AssignmentOutcome] {
        &self.outcomes
    }

    pub fn failed_assignments(&self) -> impl Iterator<Item = &AssignmentOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn record_outcome(&mut self, key: &str, value: &str, result: Result<(), PropertyError>) {
        self.outcomes.push(AssignmentOutcome {
            key: key.to_string(),
            value: value.to_string(),
            result,
        });
    }

    /// Validates and stores one property. Core properties overwrite earlier
    /// values; descriptor options follow their declared multiplicity.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), PropertyError> {
        if let Some(option_type) = core_property(self.kind(), key) {
            check_value(key, value, option_type)?;
            check_core_value(key, value)?;
            if key.eq_ignore_ascii_case("alias") {
                self.alias = Some(value.to_string());
            }
            self.properties.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
            self.properties.push((key.to_string(), value.to_string()));
            return Ok(());
        }

        let spec = self
            .descriptor
            .find_option(key)
            .ok_or_else(|| PropertyError::UnknownKey {
                key: key.to_string(),
            })?;
        check_value(key, value, spec.option_type)?;

        if spec.multiplicity == Multiplicity::Single && self.get(key).is_some() {
            return Err(PropertyError::Duplicate {
                key: key.to_string(),
            });
        }

        self.properties.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::descriptor::OptionSpec;

    fn grep() -> Arc<PluginDescriptor> {
        Arc::new(
            PluginDescriptor::new("grep", PluginKind::Filter, "grep records")
                .option(OptionSpec::new("regex", OptionType::String).multiple())
                .option(OptionSpec::new("logical_op", OptionType::String))
                .option(OptionSpec::new("buffer", OptionType::Size)),
        )
    }

    #[test]
    fn test_default_name_uses_sequence_id() {
        let instance = PluginInstance::new(grep(), 3);
        assert_eq!(instance.name(), "grep.3");
    }

    #[test]
    fn test_alias_overrides_name_and_last_alias_wins() {
        let mut instance = PluginInstance::new(grep(), 0);
        instance.apply("alias", "a").unwrap();
        instance.apply("Alias", "b").unwrap();
        assert_eq!(instance.name(), "b");
        assert_eq!(instance.get_all("alias"), vec!["b"]);
    }

    #[test]
    fn test_multiple_option_keeps_every_value() {
        let mut instance = PluginInstance::new(grep(), 0);
        instance.apply("regex", "log aa").unwrap();
        instance.apply("Regex", "log bb").unwrap();
        assert_eq!(instance.get_all("regex"), vec!["log aa", "log bb"]);
    }

    #[test]
    fn test_single_option_rejects_second_value() {
        let mut instance = PluginInstance::new(grep(), 0);
        instance.apply("logical_op", "and").unwrap();
        let err = instance.apply("logical_op", "or").unwrap_err();
        assert!(matches!(err, PropertyError::Duplicate { .. }));
        assert_eq!(instance.get("logical_op"), Some("and"));
    }

    #[test]
    fn test_unknown_and_invalid_values() {
        let mut instance = PluginInstance::new(grep(), 0);
        assert!(matches!(
            instance.apply("nope", "1"),
            Err(PropertyError::UnknownKey { .. })
        ));
        assert!(matches!(
            instance.apply("buffer", "lots"),
            Err(PropertyError::InvalidValue { .. })
        ));
        assert!(matches!(
            instance.apply("match_regex", "("),
            Err(PropertyError::InvalidValue { .. })
        ));
        assert!(instance.properties().is_empty());
    }

    #[test]
    fn test_core_properties_are_kind_specific() {
        let mut instance = PluginInstance::new(grep(), 0);
        assert!(instance.apply("match", "app.*").is_ok());
        assert!(matches!(
            instance.apply("tag", "x"),
            Err(PropertyError::UnknownKey { .. })
        ));
    }
}
