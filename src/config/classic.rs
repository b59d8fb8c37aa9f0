//! Parser for the classic, INI-like configuration format.
//!
//! ```text
//! @SET environment=production
//! @INCLUDE outputs.conf
//!
//! [SERVICE]
//!     Flush     5
//!
//! [INPUT]
//!     Name      cpu
//!     Tag       cpu.local
//! ```

use crate::config::tree::{ConfigDocument, PropertyValue, RawSection};
use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

const MAX_INCLUDE_DEPTH: usize = 16;

pub fn parse_file(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let mut parser = ClassicParser::default();
    parser.parse_file(path)?;
    Ok(parser.document)
}

/// Parses in-memory content. `@INCLUDE` paths resolve against `origin`'s
/// directory.
pub fn parse_str(content: &str, origin: &Path) -> Result<ConfigDocument, ConfigError> {
    let mut parser = ClassicParser::default();
    parser.parse_content(content, origin)?;
    Ok(parser.document)
}

#[derive(Default)]
struct ClassicParser {
    document: ConfigDocument,
    includes: Vec<PathBuf>,
}

impl ClassicParser {
    fn parse_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let canonical = fs::canonicalize(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if self.includes.contains(&canonical) {
            return Err(ConfigError::Parse {
                path: path.to_path_buf(),
                line: 0,
                reason: "include cycle detected".to_string(),
            });
        }
        if self.includes.len() >= MAX_INCLUDE_DEPTH {
            return Err(ConfigError::Parse {
                path: path.to_path_buf(),
                line: 0,
                reason: format!("includes nested deeper than {MAX_INCLUDE_DEPTH} levels"),
            });
        }

        let content = fs::read_to_string(&canonical).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        self.includes.push(canonical.clone());
        let result = self.parse_content(&content, &canonical);
        self.includes.pop();
        result
    }

    fn parse_content(&mut self, content: &str, origin: &Path) -> Result<(), ConfigError> {
        let error = |line: usize, reason: String| ConfigError::Parse {
            path: origin.to_path_buf(),
            line,
            reason,
        };

        // Sections opened by this file; entries never continue a section
        // from an including or included file.
        let mut current: Option<usize> = None;

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim_end();
            let trimmed = line.trim_start();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let indented = trimmed.len() != line.len();

            if !indented && trimmed.starts_with('@') {
                let directive = &trimmed[1..];
                let (command, argument) = match directive.split_once(char::is_whitespace) {
                    Some((command, argument)) => (command, argument.trim()),
                    None => (directive, ""),
                };

                if command.eq_ignore_ascii_case("INCLUDE") {
                    if argument.is_empty() {
                        return Err(error(line_no, "@INCLUDE requires a file".to_string()));
                    }
                    let base = origin.parent().unwrap_or_else(|| Path::new("."));
                    let target = base.join(argument);
                    self.parse_file(&target)?;
                    current = None;
                } else {
                    self.document
                        .metas
                        .push((command.to_ascii_uppercase(), argument.to_string()));
                }
                continue;
            }

            if !indented && trimmed.starts_with('[') {
                let name = trimmed
                    .strip_prefix('[')
                    .and_then(|rest| rest.strip_suffix(']'))
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| error(line_no, format!("invalid section header '{trimmed}'")))?;

                self.document.sections.push(RawSection::new(name.to_ascii_lowercase()));
                current = Some(self.document.sections.len() - 1);
                continue;
            }

            if !indented {
                return Err(error(
                    line_no,
                    format!("entry '{trimmed}' must be indented under a section"),
                ));
            }

            let Some(section) = current else {
                return Err(error(
                    line_no,
                    format!("entry '{trimmed}' is outside of any section"),
                ));
            };

            let (key, value) = trimmed
                .split_once(char::is_whitespace)
                .map(|(k, v)| (k, v.trim()))
                .filter(|(_, v)| !v.is_empty())
                .ok_or_else(|| error(line_no, format!("key '{trimmed}' has no value")))?;

            self.document.sections[section]
                .properties
                .push((key.to_string(), PropertyValue::Scalar(value.to_string())));
        }

        Ok(())
    }
}
