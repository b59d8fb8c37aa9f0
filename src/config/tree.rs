//! Configuration tree: sections of properties plus env and meta directives.

use crate::plugin::PluginKind;
use std::fmt;
use std::path::PathBuf;

/// A property value: one string, or an ordered list applied element by
/// element under the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Scalar(String),
    List(Vec<String>),
}

impl PropertyValue {
    /// Every individual value, in order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            PropertyValue::Scalar(v) => vec![v.as_str()],
            PropertyValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            PropertyValue::Scalar(v) => Some(v),
            PropertyValue::List(_) => None,
        }
    }

    /// Single-string rendering; list elements are joined by spaces.
    pub fn to_joined(&self) -> String {
        match self {
            PropertyValue::Scalar(v) => v.clone(),
            PropertyValue::List(items) => items.join(" "),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Scalar(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Scalar(v)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(v: Vec<String>) -> Self {
        PropertyValue::List(v)
    }
}

/// Kinds a validated section may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Service,
    Custom,
    Input,
    Filter,
    Output,
}

impl SectionKind {
    pub fn plugin_kind(&self) -> Option<PluginKind> {
        match self {
            SectionKind::Service => None,
            SectionKind::Custom => Some(PluginKind::Custom),
            SectionKind::Input => Some(PluginKind::Input),
            SectionKind::Filter => Some(PluginKind::Filter),
            SectionKind::Output => Some(PluginKind::Output),
        }
    }
}

impl From<PluginKind> for SectionKind {
    fn from(kind: PluginKind) -> Self {
        match kind {
            PluginKind::Custom => SectionKind::Custom,
            PluginKind::Input => SectionKind::Input,
            PluginKind::Filter => SectionKind::Filter,
            PluginKind::Output => SectionKind::Output,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.plugin_kind() {
            Some(kind) => write!(f, "{kind}"),
            None => f.write_str("service"),
        }
    }
}

/// One block of configuration. Keys may repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub properties: Vec<(String, PropertyValue)>,
}

impl Section {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            properties: Vec::new(),
        }
    }

    /// Section of a plugin kind with its `name` already set.
    pub fn plugin(kind: PluginKind, name: impl Into<String>) -> Self {
        let mut section = Self::new(kind.into());
        section.push("name", name.into());
        section
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.push((key.into(), value.into()));
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.push(key, value);
        self
    }

    /// The `name` property (case-insensitive), joined if given as a list.
    pub fn name(&self) -> Option<String> {
        self.properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("name"))
            .map(|(_, v)| v.to_joined())
    }

    /// Every property except `name`, in declaration order.
    pub fn plugin_properties(&self) -> impl Iterator<Item = &(String, PropertyValue)> {
        self.properties
            .iter()
            .filter(|(k, _)| !k.eq_ignore_ascii_case("name"))
    }
}

/// A section as read from a file, before its kind is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    pub kind: String,
    pub properties: Vec<(String, PropertyValue)>,
}

impl RawSection {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            properties: Vec::new(),
        }
    }
}

/// Parsed, unvalidated contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    pub sections: Vec<RawSection>,
    /// Meta directives (`@SET`, ...) as `(command, argument)`, in file order.
    pub metas: Vec<(String, String)>,
}

/// The merged configuration. Immutable once instantiation begins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigTree {
    pub sections: Vec<Section>,
    pub env: Vec<(String, String)>,
    pub metas: Vec<(String, String)>,
    /// Canonical directory of the main file, with a trailing separator.
    pub root_dir: Option<PathBuf>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sections_of(&self, kind: SectionKind) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| s.kind == kind)
    }

    pub fn plugin_sections(&self, kind: PluginKind) -> impl Iterator<Item = &Section> {
        self.sections_of(kind.into())
    }

    /// Service section, created on first use.
    pub fn service_mut(&mut self) -> &mut Section {
        let index = match self
            .sections
            .iter()
            .position(|s| s.kind == SectionKind::Service)
        {
            Some(index) => index,
            None => {
                self.sections.push(Section::new(SectionKind::Service));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }
}
