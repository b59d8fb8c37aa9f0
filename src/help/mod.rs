//! Plugin introspection
//!
//! - `schema`: builds a [`SchemaDocument`] from a registered plugin
//! - `render`: lays a document out as column aligned text or JSON
//! - `usage`: help for the whole tool

pub mod render;
pub mod schema;
pub mod usage;

pub use render::{column_width, parse_json, render_json, render_text, wrap, LINE_WIDTH};
pub use schema::{describe, describe_all, Categories, SchemaDocument, SchemaOption};
