//! Fixture loading: resolve a fixture module and normalize it to a mapping
//!
//! A fixture module is either plain data (a JSON/TOML file, or a mapping registered in code) or a factory that is
//! handed the unit's [`TestHandle`] and returns the data. Whatever it resolves to must be a mapping.
//!
//! Global and local fixtures fail differently: a global fixture is mandatory context, so any failure is reported as a
//! failing assertion on the unit; a local fixture is optional per-spec decoration, so failing to load one is silent.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use specrig_core::{ValueKind, describe};

use crate::assertion::TestHandle;
use crate::module::{self, LoadError};

/// A fixture factory: called once per unit with that unit's handle.
pub type Factory = Arc<dyn Fn(&TestHandle) -> Value + Send + Sync>;

/// Which role a fixture plays for the unit being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureScope {
    /// Listed in the configuration; applied to every unit
    Global,
    /// Named after the spec file; applied to that spec only
    Local,
}

/// A resolved fixture module, before normalization.
#[derive(Clone)]
pub enum FixtureModule {
    Data(Value),
    Factory(Factory),
}

impl fmt::Debug for FixtureModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureModule::Data(value) => f.debug_tuple("Data").field(value).finish(),
            FixtureModule::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Resolve a fixture path to a module.
pub trait FixtureLoader {
    fn load(&self, path: &Path) -> Result<FixtureModule, LoadError>;
}

/// Fixtures defined in code, keyed by their path under the fixture root.
#[derive(Clone, Default)]
pub struct FixtureRegistry {
    modules: HashMap<String, FixtureModule>,
}

impl FixtureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `key` (for example `global/globalB`).
    pub fn factory<F>(mut self, key: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&TestHandle) -> Value + Send + Sync + 'static,
    {
        self.modules.insert(key.into(), FixtureModule::Factory(Arc::new(factory)));
        self
    }

    /// Register a fixed value under `key`.
    pub fn data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.modules.insert(key.into(), FixtureModule::Data(value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&FixtureModule> {
        self.modules.get(key)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl fmt::Debug for FixtureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.modules.keys().collect();
        keys.sort();
        f.debug_struct("FixtureRegistry").field("keys", &keys).finish()
    }
}

/// Default loader: registered modules first, then data files under the fixture root.
#[derive(Debug)]
pub struct FixtureSources {
    root: PathBuf,
    registry: FixtureRegistry,
}

impl FixtureSources {
    pub fn new(root: impl Into<PathBuf>, registry: FixtureRegistry) -> Self {
        Self {
            root: root.into(),
            registry,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FixtureLoader for FixtureSources {
    fn load(&self, path: &Path) -> Result<FixtureModule, LoadError> {
        let key = module::module_key(&self.root, path);
        if let Some(registered) = self.registry.get(&key) {
            return Ok(registered.clone());
        }
        let file = module::find_data_file(path).ok_or_else(|| LoadError::NotFound(path.to_path_buf()))?;
        module::read_data_file(&file).map(FixtureModule::Data)
    }
}

/// Load the fixture at `path` for one unit and normalize it to a mapping.
///
/// Never fails: a global fixture failure becomes a failing assertion on `handle`, a local fixture failure is
/// dropped. Either way the fixture contributes an empty mapping.
#[tracing::instrument(level = "debug", skip_all, fields(fixture = %path.display(), ?scope))]
pub fn load_fixture<L: FixtureLoader + ?Sized>(
    loader: &L,
    path: &Path,
    handle: &TestHandle,
    scope: FixtureScope,
) -> Map<String, Value> {
    match resolve(loader, path, handle) {
        Ok(map) => map,
        Err(err) => {
            match scope {
                FixtureScope::Global => {
                    handle.fail(format!("Unable to load global fixture <{}> -> {}", module::base_name(path), err));
                }
                FixtureScope::Local => {
                    tracing::debug!(error = %err, "no local fixture");
                }
            }
            Map::new()
        }
    }
}

fn resolve<L: FixtureLoader + ?Sized>(
    loader: &L,
    path: &Path,
    handle: &TestHandle,
) -> Result<Map<String, Value>, LoadError> {
    let value = match loader.load(path)? {
        FixtureModule::Data(value) => value,
        FixtureModule::Factory(factory) => {
            panic::catch_unwind(AssertUnwindSafe(|| factory(handle))).map_err(|payload| LoadError::Panicked {
                key: module::base_name(path),
                message: panic_message(payload.as_ref()),
            })?
        }
    };
    match value {
        Value::Object(map) => Ok(map),
        other => Err(LoadError::NotAMapping {
            name: module::base_name(path),
            kind: ValueKind::of(&other),
            repr: describe(&other),
        }),
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
