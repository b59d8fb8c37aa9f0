//! Merging of file and command line configuration.

use crate::config::loader::{load_document, root_dir};
use crate::config::tree::{ConfigDocument, ConfigTree, PropertyValue, Section, SectionKind};
use crate::error::ConfigError;
use crate::plugin::PluginKind;
use crate::state::AppState;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Loads `file` (when given) and merges it with the command line fragment.
///
/// Environment and meta directives are applied to `state` along the way;
/// on error nothing should be instantiated from the partial result.
pub fn merge(
    file: Option<&Path>,
    cli: ConfigTree,
    state: &mut AppState,
) -> Result<ConfigTree, ConfigError> {
    let (document, root) = match file {
        Some(path) => (load_document(path)?, Some(root_dir(path)?)),
        None => (ConfigDocument::default(), None),
    };
    merge_document(document, root, cli, state)
}

/// Merge step operating on an already parsed document.
pub fn merge_document(
    document: ConfigDocument,
    root: Option<PathBuf>,
    cli: ConfigTree,
    state: &mut AppState,
) -> Result<ConfigTree, ConfigError> {
    let mut tree = ConfigTree {
        root_dir: root.clone(),
        metas: document.metas.clone(),
        ..ConfigTree::default()
    };
    state.root_dir = root;

    // Environment directives: file `env` sections first, then any supplied
    // alongside the command line.
    for section in document
        .sections
        .iter()
        .filter(|s| s.kind.eq_ignore_ascii_case("env"))
    {
        for (key, value) in &section.properties {
            tree.env.push((key.clone(), value.to_joined()));
        }
    }
    tree.env.extend(cli.env.iter().cloned());

    for (key, value) in &tree.env {
        state.env.set(key, value)?;
    }

    for (command, argument) in &tree.metas {
        run_meta(state, command, argument)?;
    }

    // Section validation happens before anything is applied from them.
    // Parser sections are rejected wherever they appear in the file.
    if let Some(raw) = document.sections.iter().find(|s| is_parser_section(&s.kind)) {
        return Err(ConfigError::ForbiddenSection(raw.kind.clone()));
    }

    let mut sections = Vec::with_capacity(document.sections.len());
    for raw in document.sections {
        let kind = raw.kind.to_ascii_lowercase();
        let kind = match kind.as_str() {
            "env" => continue,
            "service" => SectionKind::Service,
            other => match PluginKind::from_section_name(other) {
                Some(plugin_kind) => plugin_kind.into(),
                None => return Err(ConfigError::InvalidSection(raw.kind)),
            },
        };
        sections.push(Section {
            kind,
            properties: raw.properties,
        });
    }

    // Service settings: file values first so the command line wins.
    let cli_service: Vec<&Section> = cli.sections_of(SectionKind::Service).collect();
    for section in sections
        .iter()
        .filter(|s| s.kind == SectionKind::Service)
        .chain(cli_service.iter().copied())
    {
        apply_service(state, section)?;
    }

    tree.sections = sections;
    for section in cli.sections {
        match section.kind {
            SectionKind::Service => tree.service_mut().properties.extend(section.properties),
            _ => tree.sections.push(section),
        }
    }

    debug!(
        sections = tree.sections.len(),
        env = tree.env.len(),
        metas = tree.metas.len(),
        "configuration merged"
    );
    Ok(tree)
}

fn is_parser_section(kind: &str) -> bool {
    kind.eq_ignore_ascii_case("parser") || kind.eq_ignore_ascii_case("multiline_parser")
}

fn apply_service(state: &mut AppState, section: &Section) -> Result<(), ConfigError> {
    for (key, value) in &section.properties {
        let PropertyValue::Scalar(value) = value else {
            return Err(ConfigError::ServiceProperty {
                key: key.clone(),
                reason: "the service section does not accept list values".to_string(),
            });
        };

        let value = state.env.translate(value);
        if !state.service.set_property(key, &value)? {
            warn!("unknown service property '{}' ignored", key);
        }
    }
    Ok(())
}

/// Executes one meta directive against the load context.
fn run_meta(state: &mut AppState, command: &str, argument: &str) -> Result<(), ConfigError> {
    let failure = |reason: &str| ConfigError::Meta {
        command: command.to_string(),
        reason: reason.to_string(),
    };

    if command.eq_ignore_ascii_case("SET") {
        let (key, value) = argument
            .split_once('=')
            .ok_or_else(|| failure("expected KEY=VALUE"))?;
        let value = state.env.translate(value.trim());
        state
            .env
            .set(key.trim(), &value)
            .map_err(|_| failure("invalid variable name"))?;
        return Ok(());
    }

    Err(failure("unknown meta command"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tree::RawSection;

    fn raw(kind: &str, props: &[(&str, &str)]) -> RawSection {
        let mut section = RawSection::new(kind);
        for (k, v) in props {
            section.properties.push((k.to_string(), PropertyValue::from(*v)));
        }
        section
    }

    #[test]
    fn test_env_and_meta_feed_the_overlay() {
        let document = ConfigDocument {
            sections: vec![raw("env", &[("MERGE_TEST_A", "one")])],
            metas: vec![("SET".into(), "MERGE_TEST_B=${MERGE_TEST_A}-two".into())],
        };
        let mut state = AppState::default();
        merge_document(document, None, ConfigTree::new(), &mut state).unwrap();

        assert_eq!(state.env.get("MERGE_TEST_A").as_deref(), Some("one"));
        assert_eq!(state.env.get("MERGE_TEST_B").as_deref(), Some("one-two"));
    }

    #[test]
    fn test_unknown_meta_command_is_fatal() {
        let document = ConfigDocument {
            sections: vec![],
            metas: vec![("FROB".into(), "x".into())],
        };
        let err = merge_document(document, None, ConfigTree::new(), &mut AppState::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Meta { .. }));
    }

    #[test]
    fn test_forbidden_and_invalid_sections_are_distinct() {
        let forbidden = ConfigDocument {
            sections: vec![raw("input", &[("name", "cpu")]), raw("multiline_parser", &[])],
            metas: vec![],
        };
        let err = merge_document(forbidden, None, ConfigTree::new(), &mut AppState::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::ForbiddenSection(ref k) if k == "multiline_parser"));

        let invalid = ConfigDocument {
            sections: vec![raw("inputz", &[])],
            metas: vec![],
        };
        let err = merge_document(invalid, None, ConfigTree::new(), &mut AppState::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSection(ref k) if k == "inputz"));
    }

    #[test]
    fn test_cli_service_overrides_file_and_sections_append() {
        let document = ConfigDocument {
            sections: vec![
                raw("service", &[("flush", "5"), ("grace", "9")]),
                raw("output", &[("name", "stdout")]),
            ],
            metas: vec![],
        };
        let mut cli = ConfigTree::new();
        cli.service_mut().push("flush", "2");
        cli.sections.push(Section::plugin(PluginKind::Output, "null"));

        let mut state = AppState::default();
        let tree = merge_document(document, None, cli, &mut state).unwrap();

        assert_eq!(state.service.flush, 2.0);
        assert_eq!(state.service.grace, 9);
        let outputs: Vec<_> = tree
            .plugin_sections(PluginKind::Output)
            .filter_map(Section::name)
            .collect();
        assert_eq!(outputs, vec!["stdout", "null"]);
        assert_eq!(tree.sections_of(SectionKind::Service).count(), 1);
    }

    #[test]
    fn test_service_list_value_is_rejected() {
        let mut section = RawSection::new("service");
        section.properties.push((
            "flush".into(),
            PropertyValue::List(vec!["1".into(), "2".into()]),
        ));
        let document = ConfigDocument {
            sections: vec![section],
            metas: vec![],
        };
        let err = merge_document(document, None, ConfigTree::new(), &mut AppState::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::ServiceProperty { .. }));
    }
}
