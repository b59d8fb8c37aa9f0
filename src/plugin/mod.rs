//! Plugin model
//!
//! Plugins come in four kinds (custom, input, filter, output). Each exposes
//! a [`PluginDescriptor`] declaring its options, and a [`PluginFactory`]
//! through which the engine creates instances and assigns properties.
//!
//! # Modules
//!
//! - `descriptor`: plugin kinds, option specs and descriptors
//! - `instance`: live instances and property validation
//! - `registry`: the factory trait and the lookup table of known plugins
//! - `builtin`: descriptors of the plugins shipped with the binary

pub mod builtin;
pub mod descriptor;
pub mod instance;
pub mod registry;

pub use crate::error::PluginError;
pub use descriptor::{
    Multiplicity, OptionSpec, OptionType, PluginDescriptor, PluginKind, DEFAULT_CATEGORY,
};
pub use instance::{AssignmentOutcome, PluginInstance, PropertyError};
pub use registry::{PluginFactory, PluginRegistry, StaticPlugin};
