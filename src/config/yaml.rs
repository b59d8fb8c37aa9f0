//! YAML configuration format.
//!
//! ```yaml
//! env:
//!   OUT: stdout
//! service:
//!   flush: 1
//! pipeline:
//!   inputs:
//!     - name: cpu
//!       tag: cpu.local
//!   outputs:
//!     - name: ${OUT}
//!       match: "*"
//! ```

use crate::config::tree::{ConfigDocument, PropertyValue, RawSection};
use crate::error::ConfigError;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_INCLUDE_DEPTH: usize = 16;

pub fn parse_file(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let mut document = ConfigDocument::default();
    let mut stack = Vec::new();
    parse_into(path, &mut document, &mut stack)?;
    Ok(document)
}

pub fn parse_str(content: &str, origin: &Path) -> Result<ConfigDocument, ConfigError> {
    let mut document = ConfigDocument::default();
    let mut stack = Vec::new();
    parse_content(content, origin, &mut document, &mut stack)?;
    Ok(document)
}

fn parse_into(
    path: &Path,
    document: &mut ConfigDocument,
    stack: &mut Vec<PathBuf>,
) -> Result<(), ConfigError> {
    let canonical = fs::canonicalize(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if stack.contains(&canonical) || stack.len() >= MAX_INCLUDE_DEPTH {
        return Err(invalid(path, "include cycle detected or includes nested too deeply"));
    }

    let content = fs::read_to_string(&canonical).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    stack.push(canonical.clone());
    let result = parse_content(&content, &canonical, document, stack);
    stack.pop();
    result
}

fn invalid(path: &Path, reason: impl Into<String>) -> ConfigError {
    ConfigError::Parse {
        path: path.to_path_buf(),
        line: 0,
        reason: reason.into(),
    }
}

fn parse_content(
    content: &str,
    origin: &Path,
    document: &mut ConfigDocument,
    stack: &mut Vec<PathBuf>,
) -> Result<(), ConfigError> {
    if content.trim().is_empty() {
        return Ok(());
    }

    let root: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
        path: origin.to_path_buf(),
        line: e.location().map(|l| l.line()).unwrap_or(0),
        reason: e.to_string(),
    })?;

    let root = match root {
        Value::Mapping(map) => map,
        Value::Null => return Ok(()),
        _ => return Err(invalid(origin, "top level must be a mapping")),
    };

    for (key, value) in root {
        let key = scalar_string(&key)
            .ok_or_else(|| invalid(origin, "top level keys must be strings"))?;

        match key.to_ascii_lowercase().as_str() {
            "env" | "service" => {
                document.sections.push(section_from(&key, &value, origin)?);
            }
            "includes" => {
                let base = origin.parent().unwrap_or_else(|| Path::new("."));
                for include in list_of_strings(&value, origin, "includes")? {
                    parse_into(&base.join(include), document, stack)?;
                }
            }
            "pipeline" => {
                let Value::Mapping(pipeline) = value else {
                    return Err(invalid(origin, "'pipeline' must be a mapping"));
                };
                for (group, entries) in pipeline {
                    let group = scalar_string(&group)
                        .ok_or_else(|| invalid(origin, "pipeline keys must be strings"))?;
                    push_group(document, &group, &entries, origin)?;
                }
            }
            _ => push_group(document, &key, &value, origin)?,
        }
    }

    Ok(())
}

/// Maps plural group names (`inputs`, `parsers`, ...) to section kinds and
/// adds one section per entry.
fn push_group(
    document: &mut ConfigDocument,
    group: &str,
    value: &Value,
    origin: &Path,
) -> Result<(), ConfigError> {
    let kind = match group.to_ascii_lowercase().as_str() {
        "customs" => "custom".to_string(),
        "inputs" => "input".to_string(),
        "filters" => "filter".to_string(),
        "outputs" => "output".to_string(),
        "parsers" => "parser".to_string(),
        "multiline_parsers" => "multiline_parser".to_string(),
        other => other.to_string(),
    };

    match value {
        Value::Sequence(entries) => {
            for entry in entries {
                document.sections.push(section_from(&kind, entry, origin)?);
            }
        }
        Value::Null => document.sections.push(RawSection::new(kind)),
        other => document.sections.push(section_from(&kind, other, origin)?),
    }
    Ok(())
}

fn section_from(kind: &str, value: &Value, origin: &Path) -> Result<RawSection, ConfigError> {
    let mut section = RawSection::new(kind.to_ascii_lowercase());
    let map: &Mapping = match value {
        Value::Mapping(map) => map,
        Value::Null => return Ok(section),
        _ => return Err(invalid(origin, format!("'{kind}' entries must be mappings"))),
    };

    for (key, value) in map {
        let key = scalar_string(key)
            .ok_or_else(|| invalid(origin, format!("'{kind}' property keys must be strings")))?;
        let value = match value {
            Value::Sequence(_) => PropertyValue::List(list_of_strings(value, origin, &key)?),
            other => PropertyValue::Scalar(scalar_string(other).ok_or_else(|| {
                invalid(origin, format!("property '{key}' must be a scalar or a list"))
            })?),
        };
        section.properties.push((key, value));
    }

    Ok(section)
}

fn list_of_strings(value: &Value, origin: &Path, key: &str) -> Result<Vec<String>, ConfigError> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                scalar_string(item)
                    .ok_or_else(|| invalid(origin, format!("'{key}' list items must be scalars")))
            })
            .collect(),
        other => scalar_string(other)
            .map(|s| vec![s])
            .ok_or_else(|| invalid(origin, format!("'{key}' must be a list"))),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_groups_become_sections() {
        let content = r#"
env:
  OUT: stdout
service:
  flush: 2
pipeline:
  inputs:
    - name: cpu
      interval_sec: 5
  filters:
    - name: grep
      regex:
        - log aa
        - log bb
  outputs:
    - name: ${OUT}
      match: "*"
"#;
        let doc = parse_str(content, Path::new("/tmp/x.yaml")).unwrap();
        let kinds: Vec<_> = doc.sections.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, vec!["env", "service", "input", "filter", "output"]);

        assert_eq!(
            doc.sections[2].properties[1],
            ("interval_sec".to_string(), PropertyValue::Scalar("5".to_string()))
        );
        assert_eq!(
            doc.sections[3].properties[1].1,
            PropertyValue::List(vec!["log aa".to_string(), "log bb".to_string()])
        );
    }

    #[test]
    fn test_top_level_plural_groups_and_parsers() {
        let content = "customs:\n  - name: heartbeat\nparsers:\n  - name: json\n";
        let doc = parse_str(content, Path::new("/tmp/x.yaml")).unwrap();
        let kinds: Vec<_> = doc.sections.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, vec!["custom", "parser"]);
    }

    #[test]
    fn test_unknown_top_level_key_kept_for_validation() {
        let doc = parse_str("bogus:\n  a: 1\n", Path::new("/tmp/x.yaml")).unwrap();
        assert_eq!(doc.sections[0].kind, "bogus");
    }

    #[test]
    fn test_nested_maps_rejected() {
        let content = "pipeline:\n  inputs:\n    - name: cpu\n      nested:\n        a: 1\n";
        assert!(parse_str(content, Path::new("/tmp/x.yaml")).is_err());
    }

    #[test]
    fn test_empty_document_is_empty_config() {
        let doc = parse_str("", Path::new("/tmp/x.yaml")).unwrap();
        assert!(doc.sections.is_empty());
    }
}
