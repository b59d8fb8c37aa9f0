//! Config file loading

use crate::config::tree::ConfigDocument;
use crate::config::{classic, yaml};
use crate::error::ConfigError;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Reads a configuration file, choosing the format from its extension:
/// `.yaml`/`.yml` are YAML, anything else is the classic format.
pub fn load_document(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    tracing::debug!("Loading configuration file {}", path.display());

    match ext.as_str() {
        "yaml" | "yml" => yaml::parse_file(path),
        _ => classic::parse_file(path),
    }
}

/// Canonical directory holding `path`, ending with a separator.
pub fn root_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let canonical = path.canonicalize().map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parent = canonical.parent().unwrap_or_else(|| Path::new("/"));

    let mut dir = parent.to_string_lossy().into_owned();
    if !dir.ends_with(MAIN_SEPARATOR) {
        dir.push(MAIN_SEPARATOR);
    }
    Ok(PathBuf::from(dir))
}
