//! Plugin instantiation and the running phase
//!
//! [`instantiate`] is one routine for all plugin kinds, driven through the
//! [`PluginFactory`](crate::plugin::PluginFactory) capability set.
//! [`instantiate_all`] runs it for every kind in [`PluginKind::ORDERED`].

pub mod shutdown;
pub mod topology;

pub use shutdown::{install_handlers, signal_name, EngineState, SignalFlags, Watcher};
pub use topology::Topology;

use crate::config::ConfigTree;
use crate::error::PluginError;
use crate::plugin::PluginKind;
use crate::state::AppState;
use tracing::{debug, error};

/// Creates the instances declared by every `kind` section of `tree`.
///
/// A missing `name` or a name no registered plugin answers to aborts the
/// pass. Rejected properties are logged, recorded on the instance, and
/// skipped.
pub fn instantiate(
    tree: &ConfigTree,
    kind: PluginKind,
    state: &AppState,
    topology: &mut Topology,
) -> Result<(), PluginError> {
    for section in tree.plugin_sections(kind) {
        let name = section.name().ok_or(PluginError::MissingName { kind })?;
        let name = state.env.translate(&name);

        let factory = state
            .registry
            .resolve(kind, &name)
            .ok_or_else(|| PluginError::UnknownPlugin {
                kind,
                name: name.clone(),
            })?;

        let mut instance = factory.create(topology.next_id(kind));
        debug!(kind = %kind, plugin = %name, "created instance {}", instance.name());

        for (key, value) in section.plugin_properties() {
            for raw in value.values() {
                let value = state.env.translate(raw);
                let result = factory.assign(&mut instance, key, &value);
                if let Err(e) = &result {
                    error!(
                        kind = %kind,
                        plugin = %instance.name(),
                        key = %key,
                        "cannot set property: {}",
                        e
                    );
                }
                instance.record_outcome(key, &value, result);
            }
        }

        topology.push(instance);
    }

    Ok(())
}

/// Runs [`instantiate`] for custom, input, filter and output sections in
/// that order, stopping at the first fatal error.
pub fn instantiate_all(
    tree: &ConfigTree,
    state: &AppState,
    topology: &mut Topology,
) -> Result<(), PluginError> {
    for kind in PluginKind::ORDERED {
        instantiate(tree, kind, state, topology)?;
    }
    Ok(())
}

/// Builds a fresh topology from `tree`.
pub fn build_topology(tree: &ConfigTree, state: &AppState) -> Result<Topology, PluginError> {
    let mut topology = Topology::new();
    instantiate_all(tree, state, &mut topology)?;
    Ok(topology)
}
