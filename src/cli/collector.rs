use crate::cli::CliOption;
use crate::config::{ConfigTree, Section, SectionKind};
use crate::error::CliError;
use crate::plugin::PluginKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpFormat {
    Text,
    Json,
}

/// What a help flag asked for, depending on where it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpRequest {
    General(HelpFormat),
    Plugin {
        kind: PluginKind,
        name: String,
        format: HelpFormat,
    },
}

/// Result of collecting the command line.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub tree: ConfigTree,
    /// Index in `tree.sections` of the section open when collection ended.
    pub current: Option<usize>,
    pub help: Option<HelpRequest>,
}

/// Builds a configuration fragment from ordered command line options.
#[derive(Debug, Default)]
pub struct OptionCollector {
    tree: ConfigTree,
    current: Option<usize>,
}

impl OptionCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes every option, stopping early at a help request.
    pub fn collect(options: impl IntoIterator<Item = CliOption>) -> Result<Collected, CliError> {
        let mut collector = Self::new();
        for option in options {
            if let Some(help) = collector.apply(option)? {
                return Ok(collector.finish_with(Some(help)));
            }
        }
        Ok(collector.finish_with(None))
    }

    /// The section opened by the most recent plugin flag.
    pub fn current(&self) -> Option<&Section> {
        self.current.map(|index| &self.tree.sections[index])
    }

    pub fn apply(&mut self, option: CliOption) -> Result<Option<HelpRequest>, CliError> {
        match option {
            CliOption::Plugin { kind, name } => {
                self.tree.sections.push(Section::plugin(kind, name));
                self.current = Some(self.tree.sections.len() - 1);
            }
            CliOption::Prop(raw) => {
                let (key, value) = raw
                    .split_once('=')
                    .map(|(k, v)| (k.trim(), v.trim()))
                    .filter(|(k, _)| !k.is_empty())
                    .ok_or_else(|| CliError::MalformedProperty(raw.clone()))?;
                self.bind(key, value, |_| true);
            }
            CliOption::Tag(tag) => self.bind("tag", &tag, |_| true),
            CliOption::Match(rule) => self.bind("match", &rule, |kind| {
                matches!(kind, SectionKind::Filter | SectionKind::Output)
            }),
            CliOption::StoragePath(path) => self.service("storage.path", path),
            CliOption::Flush(seconds) => self.service("flush", seconds),
            CliOption::LogFile(path) => self.service("log_file", path),
            CliOption::Parser(path) => self.service("parsers_file", path),
            CliOption::Daemon => self.service("daemon", "on".to_string()),
            CliOption::Http => self.service("http_server", "on".to_string()),
            CliOption::HttpListen(addr) => self.service("http_listen", addr),
            CliOption::HttpPort(port) => self.service("http_port", port),
            CliOption::CoroStackSize(size) => self.service("coro_stack_size", size),
            CliOption::Help => return Ok(Some(self.help_request(HelpFormat::Text))),
            CliOption::HelpJson => return Ok(Some(self.help_request(HelpFormat::Json))),
        }
        Ok(None)
    }

    pub fn finish(self) -> ConfigTree {
        self.tree
    }

    fn finish_with(self, help: Option<HelpRequest>) -> Collected {
        Collected {
            tree: self.tree,
            current: self.current,
            help,
        }
    }

    /// Adds `key=value` to the open section when `accepts` its kind; with no
    /// open section the property is dropped.
    fn bind(&mut self, key: &str, value: &str, accepts: impl Fn(SectionKind) -> bool) {
        match self.current {
            Some(index) if accepts(self.tree.sections[index].kind) => {
                self.tree.sections[index].push(key, value);
            }
            _ => tracing::debug!("no open section for '{}', ignoring", key),
        }
    }

    fn service(&mut self, key: &str, value: String) {
        self.tree.service_mut().push(key, value);
    }

    fn help_request(&self, format: HelpFormat) -> HelpRequest {
        let plugin = self.current().and_then(|section| {
            let kind = section.kind.plugin_kind()?;
            Some((kind, section.name()?))
        });

        match plugin {
            Some((kind, name)) => HelpRequest::Plugin { kind, name, format },
            None => HelpRequest::General(format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PropertyValue;

    fn plugin(kind: PluginKind, name: &str) -> CliOption {
        CliOption::Plugin {
            kind,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_properties_bind_to_most_recent_section() {
        let collected = OptionCollector::collect(vec![
            plugin(PluginKind::Input, "cpu"),
            CliOption::Prop("Interval_Sec=5".into()),
            plugin(PluginKind::Output, "stdout"),
            CliOption::Prop("Format=json".into()),
        ])
        .unwrap();

        let tree = collected.tree;
        assert_eq!(tree.sections.len(), 2);
        assert_eq!(
            tree.sections[0].properties,
            vec![
                ("name".to_string(), PropertyValue::from("cpu")),
                ("Interval_Sec".to_string(), PropertyValue::from("5")),
            ]
        );
        assert_eq!(
            tree.sections[1].properties[1],
            ("Format".to_string(), PropertyValue::from("json"))
        );
        assert_eq!(collected.current, Some(1));
    }

    #[test]
    fn test_properties_without_open_section_are_dropped() {
        let tree = OptionCollector::collect(vec![
            CliOption::Prop("a=b".into()),
            CliOption::Tag("t".into()),
        ])
        .unwrap()
        .tree;
        assert!(tree.sections.is_empty());
    }

    #[test]
    fn test_match_only_binds_to_filters_and_outputs() {
        let tree = OptionCollector::collect(vec![
            plugin(PluginKind::Input, "dummy"),
            CliOption::Match("*".into()),
            CliOption::Tag("d".into()),
            plugin(PluginKind::Filter, "grep"),
            CliOption::Match("d".into()),
        ])
        .unwrap()
        .tree;

        let input_keys: Vec<_> = tree.sections[0].properties.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(input_keys, vec!["name", "tag"]);
        assert_eq!(tree.sections[1].properties.len(), 2);
    }

    #[test]
    fn test_malformed_property_stops_collection() {
        let err = OptionCollector::collect(vec![
            plugin(PluginKind::Input, "cpu"),
            CliOption::Prop("no_equals_sign".into()),
        ])
        .unwrap_err();
        assert!(matches!(err, CliError::MalformedProperty(ref p) if p == "no_equals_sign"));
    }

    #[test]
    fn test_service_flags_write_service_section() {
        let mut collector = OptionCollector::new();
        collector.apply(plugin(PluginKind::Input, "cpu")).unwrap();
        collector.apply(CliOption::StoragePath("/tmp/buf".into())).unwrap();
        collector.apply(CliOption::Http).unwrap();
        assert_eq!(collector.current().and_then(Section::name).as_deref(), Some("cpu"));

        let tree = collector.finish();
        let service = tree.sections_of(SectionKind::Service).next().unwrap();
        assert_eq!(
            service.properties,
            vec![
                ("storage.path".to_string(), PropertyValue::from("/tmp/buf")),
                ("http_server".to_string(), PropertyValue::from("on")),
            ]
        );
        assert_eq!(tree.sections[0].properties.len(), 1);
    }

    #[test]
    fn test_help_targets_open_plugin_or_whole_tool() {
        let collected = OptionCollector::collect(vec![
            plugin(PluginKind::Filter, "grep"),
            CliOption::HelpJson,
            plugin(PluginKind::Output, "null"),
        ])
        .unwrap();
        assert_eq!(
            collected.help,
            Some(HelpRequest::Plugin {
                kind: PluginKind::Filter,
                name: "grep".into(),
                format: HelpFormat::Json,
            })
        );
        assert_eq!(collected.tree.sections.len(), 1);

        let collected = OptionCollector::collect(vec![CliOption::Help]).unwrap();
        assert_eq!(collected.help, Some(HelpRequest::General(HelpFormat::Text)));
    }
}
