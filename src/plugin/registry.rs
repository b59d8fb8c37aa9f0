//! Registry of known plugin factories, keyed by kind and name.

use crate::plugin::descriptor::{PluginDescriptor, PluginKind};
use crate::plugin::instance::{PluginInstance, PropertyError};
use std::sync::Arc;

/// The capability set every plugin exposes to the instantiation engine.
pub trait PluginFactory: Send + Sync {
    /// Declared identity and options.
    fn descriptor(&self) -> Arc<PluginDescriptor>;

    /// Creates a fresh, unconfigured instance.
    fn create(&self, id: usize) -> PluginInstance {
        PluginInstance::new(self.descriptor(), id)
    }

    /// Applies one `(key, value)` pair to an instance of this plugin.
    fn assign(
        &self,
        instance: &mut PluginInstance,
        key: &str,
        value: &str,
    ) -> Result<(), PropertyError> {
        instance.apply(key, value)
    }
}

/// A plugin fully described by its descriptor, using the default
/// create/assign behavior.
#[derive(Debug, Clone)]
pub struct StaticPlugin {
    descriptor: Arc<PluginDescriptor>,
}

impl StaticPlugin {
    pub fn new(descriptor: PluginDescriptor) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
        }
    }
}

impl PluginFactory for StaticPlugin {
    fn descriptor(&self) -> Arc<PluginDescriptor> {
        self.descriptor.clone()
    }
}

/// Known plugins. Populated before merging begins and read-only afterwards.
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn PluginFactory>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every built-in plugin.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for descriptor in crate::plugin::builtin::descriptors() {
            registry.register(Arc::new(StaticPlugin::new(descriptor)));
        }
        registry
    }

    /// Adds a factory. A later registration with the same kind and name
    /// shadows the earlier one.
    pub fn register(&mut self, factory: Arc<dyn PluginFactory>) {
        let descriptor = factory.descriptor();
        self.plugins.retain(|p| {
            let d = p.descriptor();
            !(d.kind == descriptor.kind && d.name.eq_ignore_ascii_case(&descriptor.name))
        });
        self.plugins.push(factory);
    }

    /// Looks up a plugin by kind and case-insensitive name.
    pub fn resolve(&self, kind: PluginKind, name: &str) -> Option<Arc<dyn PluginFactory>> {
        self.plugins
            .iter()
            .find(|p| {
                let d = p.descriptor();
                d.kind == kind && d.name.eq_ignore_ascii_case(name)
            })
            .cloned()
    }

    /// Descriptors of one kind, in registration order.
    pub fn descriptors(&self, kind: PluginKind) -> Vec<Arc<PluginDescriptor>> {
        self.plugins
            .iter()
            .map(|p| p.descriptor())
            .filter(|d| d.kind == kind)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| {
                let d = p.descriptor();
                format!("{}:{}", d.kind, d.name)
            }))
            .finish()
    }
}
