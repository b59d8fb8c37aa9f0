//! Plugin descriptors: the declared identity and option schema of a plugin.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category used when a plugin author does not group an option explicitly.
pub const DEFAULT_CATEGORY: &str = "options";

/// The four instantiable plugin kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    Custom,
    Input,
    Filter,
    Output,
}

impl PluginKind {
    /// Instantiation order. Filters and outputs may rely on every input
    /// existing by the time they are created, never the reverse.
    pub const ORDERED: [PluginKind; 4] = [
        PluginKind::Custom,
        PluginKind::Input,
        PluginKind::Filter,
        PluginKind::Output,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginKind::Custom => "custom",
            PluginKind::Input => "input",
            PluginKind::Filter => "filter",
            PluginKind::Output => "output",
        }
    }

    pub fn from_section_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "custom" => Some(PluginKind::Custom),
            "input" => Some(PluginKind::Input),
            "filter" => Some(PluginKind::Filter),
            "output" => Some(PluginKind::Output),
            _ => None,
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type accepted by an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    String,
    Integer,
    Boolean,
    Double,
    Size,
    Time,
    /// Comma separated list.
    Clist,
    /// Space separated list.
    Slist,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::String => "string",
            OptionType::Integer => "integer",
            OptionType::Boolean => "boolean",
            OptionType::Double => "double",
            OptionType::Size => "size",
            OptionType::Time => "time",
            OptionType::Clist => "clist",
            OptionType::Slist => "slist",
        }
    }
}

/// How many times, and under which keys, an option may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    #[default]
    Single,
    /// The same key may be assigned repeatedly; every value is kept.
    Multiple,
    /// The declared name is a key prefix: `Header` accepts `Header0`,
    /// `Header_Host`, and so on.
    Prefix,
}

/// One declared configuration option of a plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub name: String,
    pub option_type: OptionType,
    pub description: Option<String>,
    pub default: Option<String>,
    pub multiplicity: Multiplicity,
    pub category: String,
}

impl OptionSpec {
    pub fn new(name: impl Into<String>, option_type: OptionType) -> Self {
        Self {
            name: name.into(),
            option_type,
            description: None,
            default: None,
            multiplicity: Multiplicity::Single,
            category: DEFAULT_CATEGORY.to_string(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiplicity = Multiplicity::Multiple;
        self
    }

    pub fn prefix(mut self) -> Self {
        self.multiplicity = Multiplicity::Prefix;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Whether `key` addresses this option, ignoring ASCII case.
    pub fn matches_key(&self, key: &str) -> bool {
        match self.multiplicity {
            Multiplicity::Prefix => {
                key.len() > self.name.len()
                    && key.is_char_boundary(self.name.len())
                    && key[..self.name.len()].eq_ignore_ascii_case(&self.name)
            }
            _ => key.eq_ignore_ascii_case(&self.name),
        }
    }

    /// Type name shown in schema documents; prefix options report `prefix`.
    pub fn schema_type(&self) -> &'static str {
        match self.multiplicity {
            Multiplicity::Prefix => "prefix",
            _ => self.option_type.as_str(),
        }
    }
}

/// Identity and option schema of a plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginDescriptor {
    pub name: String,
    pub kind: PluginKind,
    pub description: String,
    pub options: Vec<OptionSpec>,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>, kind: PluginKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            options: Vec::new(),
        }
    }

    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.options.push(spec);
        self
    }

    /// Finds the option addressed by `key`. Exact names win over prefixes.
    pub fn find_option(&self, key: &str) -> Option<&OptionSpec> {
        self.options
            .iter()
            .filter(|o| o.multiplicity != Multiplicity::Prefix)
            .find(|o| o.matches_key(key))
            .or_else(|| self.options.iter().find(|o| o.matches_key(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_order_is_fixed() {
        assert_eq!(
            PluginKind::ORDERED,
            [
                PluginKind::Custom,
                PluginKind::Input,
                PluginKind::Filter,
                PluginKind::Output
            ]
        );
    }

    #[test]
    fn test_section_name_parsing_ignores_case() {
        assert_eq!(PluginKind::from_section_name("INPUT"), Some(PluginKind::Input));
        assert_eq!(PluginKind::from_section_name("Output"), Some(PluginKind::Output));
        assert_eq!(PluginKind::from_section_name("service"), None);
    }

    #[test]
    fn test_prefix_option_matching() {
        let spec = OptionSpec::new("Header", OptionType::String).prefix();
        assert!(spec.matches_key("Header0"));
        assert!(spec.matches_key("header_host"));
        assert!(!spec.matches_key("Header"));
        assert!(!spec.matches_key("Head"));
        assert_eq!(spec.schema_type(), "prefix");
    }

    #[test]
    fn test_exact_option_preferred_over_prefix() {
        let descriptor = PluginDescriptor::new("http", PluginKind::Output, "HTTP")
            .option(OptionSpec::new("header", OptionType::String).prefix())
            .option(OptionSpec::new("header_tag", OptionType::String));

        let found = descriptor.find_option("Header_Tag").expect("option");
        assert_eq!(found.name, "header_tag");
        let found = descriptor.find_option("header_x").expect("option");
        assert_eq!(found.name, "header");
    }
}
