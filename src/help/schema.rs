//! Schema documents describing a plugin's declared options.

use crate::error::PluginError;
use crate::plugin::{PluginDescriptor, PluginKind, PluginRegistry};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Type reported for options of prefix multiplicity.
pub const PREFIX_TYPE: &str = "prefix";

/// One option as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaOption {
    pub name: String,
    #[serde(rename = "type")]
    pub option_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl SchemaOption {
    /// Name as rendered in text help; prefix options get an `N` suffix.
    pub fn display_name(&self) -> String {
        if self.option_type == PREFIX_TYPE {
            format!("{}N", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Options grouped by category, in first-declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categories(Vec<(String, Vec<SchemaOption>)>);

impl Categories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `option` to `category`, creating the category if needed.
    pub fn push(&mut self, category: &str, option: SchemaOption) {
        match self.0.iter_mut().find(|(name, _)| name == category) {
            Some((_, options)) => options.push(option),
            None => self.0.push((category.to_string(), vec![option])),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SchemaOption])> {
        self.0.iter().map(|(name, options)| (name.as_str(), options.as_slice()))
    }

    pub fn get(&self, category: &str) -> Option<&[SchemaOption]> {
        self.0
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, options)| options.as_slice())
    }

    pub fn options(&self) -> impl Iterator<Item = &SchemaOption> {
        self.0.iter().flat_map(|(_, options)| options.iter())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Categories {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, options) in &self.0 {
            map.serialize_entry(name, options)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = Categories;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category names to option lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Categories, A::Error> {
                let mut categories = Categories::new();
                while let Some((name, options)) =
                    access.next_entry::<String, Vec<SchemaOption>>()?
                {
                    categories.0.push((name, options));
                }
                Ok(categories)
            }
        }

        deserializer.deserialize_map(CategoriesVisitor)
    }
}

/// Self-describing document of a plugin's options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PluginKind,
    pub description: String,
    pub properties: Categories,
}

impl SchemaDocument {
    pub fn from_descriptor(descriptor: &PluginDescriptor) -> Self {
        let mut properties = Categories::new();
        for spec in &descriptor.options {
            properties.push(
                &spec.category,
                SchemaOption {
                    name: spec.name.clone(),
                    option_type: spec.schema_type().to_string(),
                    description: spec.description.clone(),
                    default: spec.default.clone(),
                },
            );
        }

        Self {
            name: descriptor.name.clone(),
            kind: descriptor.kind,
            description: descriptor.description.clone(),
            properties,
        }
    }

    /// Whether any option can be repeated under numbered keys.
    pub fn has_prefix_options(&self) -> bool {
        self.properties
            .options()
            .any(|o| o.option_type == PREFIX_TYPE)
    }
}

/// Builds the schema of `(kind, name)`.
///
/// A throwaway instance is created to read the option list; no property
/// is applied and the instance is dropped before returning.
pub fn describe(
    registry: &PluginRegistry,
    kind: PluginKind,
    name: &str,
) -> Result<SchemaDocument, PluginError> {
    let factory = registry
        .resolve(kind, name)
        .ok_or_else(|| PluginError::UnknownPlugin {
            kind,
            name: name.to_string(),
        })?;

    let instance = factory.create(0);
    Ok(SchemaDocument::from_descriptor(instance.descriptor()))
}

/// Schemas of every registered plugin of `kind`.
pub fn describe_all(registry: &PluginRegistry, kind: PluginKind) -> Vec<SchemaDocument> {
    registry
        .descriptors(kind)
        .iter()
        .map(|d| SchemaDocument::from_descriptor(d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{OptionSpec, OptionType, StaticPlugin};
    use std::sync::Arc;

    #[test]
    fn test_options_grouped_by_category_in_order() {
        let doc = describe(&PluginRegistry::with_builtins(), PluginKind::Output, "http").unwrap();
        let names: Vec<_> = doc.properties.iter().map(|(name, _)| name).collect();
        assert_eq!(names[0], "options");
        assert!(names.contains(&"networking"));
        assert!(names.contains(&"network_tls"));
        assert_eq!(doc.kind, PluginKind::Output);
    }

    #[test]
    fn test_unknown_plugin_is_not_found() {
        let err = describe(&PluginRegistry::with_builtins(), PluginKind::Input, "nope").unwrap_err();
        assert!(matches!(err, PluginError::UnknownPlugin { .. }));
    }

    #[test]
    fn test_prefix_option_reports_prefix_type() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(StaticPlugin::new(
            PluginDescriptor::new("aliased", PluginKind::Filter, "test")
                .option(OptionSpec::new("Alias", OptionType::String).prefix()),
        )));

        let doc = describe(&registry, PluginKind::Filter, "aliased").unwrap();
        let option = doc.properties.options().next().unwrap();
        assert_eq!(option.option_type, "prefix");
        assert_eq!(option.display_name(), "AliasN");
        assert!(doc.has_prefix_options());
    }

    #[test]
    fn test_json_keeps_category_order() {
        let doc = describe(&PluginRegistry::with_builtins(), PluginKind::Input, "tail").unwrap();
        let json = serde_json::to_string(&doc).unwrap();
        let back: SchemaDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
        assert!(json.contains(r#""type":"input""#));
    }
}
