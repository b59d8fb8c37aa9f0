//! Configuration loading and merging
//!
//! Files are parsed into a [`ConfigDocument`] (classic or YAML format),
//! validated and merged with the command line fragment into a
//! [`ConfigTree`]. Service settings land in [`ServiceConfig`].

pub mod classic;
pub mod env;
pub mod loader;
pub mod merge;
pub mod service;
pub mod tree;
pub mod value;
pub mod yaml;

pub use env::Environment;
pub use loader::{load_document, root_dir};
pub use merge::{merge, merge_document};
pub use service::{page_size, ServiceConfig, ENV_PREFIX};
pub use tree::{ConfigDocument, ConfigTree, PropertyValue, RawSection, Section, SectionKind};
