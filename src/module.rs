//! Module resolution shared by fixture and spec loading
//!
//! Both fixtures and specs are addressed by path. A path under a root maps to a *key*: the path relative to the root,
//! extension stripped, components joined with `/` (`<root>/global/globalB.json` -> `global/globalB`). Registries are
//! keyed this way; data files are read from disk.

use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde_json::Value;
use specrig_core::ValueKind;
use thiserror::Error;

use crate::spec::SPEC_EXTENSION;

/// Data-file extensions tried, in order, when a fixture path has none.
pub const DATA_EXTENSIONS: &[&str] = &["json", "toml"];

/// Errors raised while resolving a fixture or spec module.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot find module '{}'", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("no spec is registered under '{0}'")]
    Unregistered(String),

    #[error("factory '{key}' panicked: {message}")]
    Panicked { key: String, message: String },

    #[error("Fixture <{name}> must be a mapping, or a factory that returns a mapping. Received: {kind} -> {repr}")]
    NotAMapping { name: String, kind: ValueKind, repr: String },
}

/// Extensions stripped when a path is turned into a key or a name. Any other dot-suffix is part of the name.
pub const MODULE_EXTENSIONS: &[&str] = &["json", "toml", SPEC_EXTENSION];

/// Key of `path` relative to `root`.
///
/// Only a module extension is stripped, so `config.v2` keys as `config.v2` while `config.v2.json` keys as
/// `config.v2`. Paths outside `root` fall back to their file name.
pub fn module_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or_else(|_| Path::new(path.file_name().unwrap_or_default()));
    strip_module_extension(relative)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Name used for a module in messages (`global/globalB.json` -> `globalB`, `db.v2` -> `db.v2`).
pub fn base_name(path: &Path) -> String {
    strip_module_extension(path)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn strip_module_extension(path: &Path) -> PathBuf {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if MODULE_EXTENSIONS.contains(&ext) => path.with_extension(""),
        _ => path.to_path_buf(),
    }
}

/// Locate a data file for `path`: the path itself, else `path.json`, else `path.toml`.
pub fn find_data_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    DATA_EXTENSIONS.iter().map(|ext| with_appended_extension(path, ext)).find(|p| p.is_file())
}

/// Read and parse a JSON or TOML data file into the value model.
///
/// Files without a `.toml` extension are parsed as JSON.
pub fn read_data_file(path: &Path) -> Result<Value, LoadError> {
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let parsed = if is_toml {
        toml::from_str::<Value>(&source).map_err(|e| e.to_string())
    } else {
        serde_json::from_str::<Value>(&source).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Append `.ext` without replacing an existing extension (`config.v2` -> `config.v2.json`).
fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}
