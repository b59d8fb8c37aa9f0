//! Environment overlay and `${VAR}` interpolation.

use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

/// Variables declared by the configuration, layered over the process
/// environment. Lookups consult the overlay first.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let key = key.trim();
        if key.is_empty() || key.contains(['=', '\0', '{', '}']) {
            return Err(ConfigError::EnvVar(key.to_string()));
        }
        self.vars.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Replaces every `${NAME}` reference. Undefined variables expand to
    /// an empty string unless a `${NAME:-default}` fallback is given.
    pub fn translate(&self, input: &str) -> String {
        var_pattern()
            .replace_all(input, |caps: &regex::Captures<'_>| {
                let reference = &caps[1];
                let (name, default) = match reference.split_once(":-") {
                    Some((name, default)) => (name, Some(default)),
                    None => (reference, None),
                };

                match self.get(name) {
                    Some(value) => value,
                    None => {
                        tracing::debug!("environment variable '{}' is not defined", name);
                        default.unwrap_or_default().to_string()
                    }
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_wins_and_translates() {
        let mut env = Environment::new();
        env.set("FLUXBIT_TEST_INPUT", "cpu").unwrap();
        assert_eq!(env.translate("${FLUXBIT_TEST_INPUT}"), "cpu");
        assert_eq!(env.translate("in_${FLUXBIT_TEST_INPUT}_x"), "in_cpu_x");
    }

    #[test]
    fn test_missing_variable_expands_empty_or_default() {
        let env = Environment::new();
        assert_eq!(env.translate("${FLUXBIT_SURELY_MISSING_VAR}"), "");
        assert_eq!(env.translate("${FLUXBIT_SURELY_MISSING_VAR:-stdout}"), "stdout");
    }

    #[test]
    fn test_text_without_references_is_untouched() {
        let env = Environment::new();
        assert_eq!(env.translate("plain $HOME {x}"), "plain $HOME {x}");
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let mut env = Environment::new();
        assert!(env.set("", "x").is_err());
        assert!(env.set("A=B", "x").is_err());
        assert!(env.is_empty());
    }
}
