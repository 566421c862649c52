//! Spec modules and their completion values
//!
//! Spec code is compiled into the harness binary. A [`SpecRegistry`] maps each spec's key (its path under the spec
//! directory without extension) to the function that runs it, and [`RegistrySpecLoader`] resolves a selected spec
//! path against that registry the way a module loader would: the file must exist and its key must be registered.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::assertion::TestHandle;
use crate::fixture::FixtureContext;
use crate::module::{self, LoadError};

/// Extension of spec module files.
pub const SPEC_EXTENSION: &str = "rs";

/// Pending asynchronous completion of a spec.
pub type SpecFuture = BoxFuture<'static, anyhow::Result<()>>;

/// What a spec returns once its synchronous body has run.
pub enum Completion {
    /// The spec finished synchronously
    Done,
    /// The spec finishes when this future settles
    Pending(SpecFuture),
}

impl Completion {
    pub fn done() -> Self {
        Completion::Done
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Completion::Pending(future.boxed())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Completion::Pending(_))
    }
}

impl From<()> for Completion {
    fn from(_: ()) -> Self {
        Completion::Done
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Done => f.write_str("Done"),
            Completion::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

type SpecFn = dyn Fn(TestHandle, FixtureContext) -> Completion + Send + Sync;

/// A runnable spec module.
#[derive(Clone)]
pub struct Spec(Arc<SpecFn>);

impl Spec {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(TestHandle, FixtureContext) -> Completion + Send + Sync + 'static,
    {
        Spec(Arc::new(f))
    }

    /// Wrap an async spec body; it always completes asynchronously.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(TestHandle, FixtureContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Spec::new(move |t, ctx| Completion::pending(f(t, ctx)))
    }

    pub(crate) fn invoke(&self, handle: TestHandle, context: FixtureContext) -> Completion {
        (self.0)(handle, context)
    }
}

impl fmt::Debug for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Spec(..)")
    }
}

/// Compiled-in spec modules keyed by their path under the spec directory.
#[derive(Debug, Clone, Default)]
pub struct SpecRegistry {
    specs: HashMap<String, Spec>,
}

impl SpecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spec under `key` (`nopromise`, `nested/deep`).
    pub fn register<F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(TestHandle, FixtureContext) -> Completion + Send + Sync + 'static,
    {
        self.specs.insert(key.into(), Spec::new(f));
        self
    }

    /// Register an async spec body under `key`.
    pub fn register_async<F, Fut>(mut self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(TestHandle, FixtureContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.specs.insert(key.into(), Spec::from_async(f));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Spec> {
        self.specs.get(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.specs.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Resolve a spec path to a runnable spec.
pub trait SpecLoader {
    fn load_spec(&self, path: &Path) -> Result<Spec, LoadError>;
}

/// Loads specs from a [`SpecRegistry`], requiring the spec file to exist under `root`.
#[derive(Debug)]
pub struct RegistrySpecLoader {
    root: PathBuf,
    registry: SpecRegistry,
}

impl RegistrySpecLoader {
    pub fn new(root: impl Into<PathBuf>, registry: SpecRegistry) -> Self {
        Self {
            root: root.into(),
            registry,
        }
    }

    /// Key a selected path maps to.
    pub fn key_for(&self, path: &Path) -> String {
        module::module_key(&self.root, path)
    }
}

impl SpecLoader for RegistrySpecLoader {
    fn load_spec(&self, path: &Path) -> Result<Spec, LoadError> {
        if !path.is_file() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        let key = self.key_for(path);
        self.registry.get(&key).cloned().ok_or(LoadError::Unregistered(key))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn noop(_: TestHandle, _: FixtureContext) -> Completion {
        Completion::done()
    }

    #[test]
    fn test_registry_keys_sorted() {
        let registry = SpecRegistry::new()
            .register("withpromise", noop)
            .register("nopromise", noop)
            .register_async("nested/deep", |_, _| async { anyhow::Ok(()) });
        assert_eq!(registry.keys(), vec!["nested/deep", "nopromise", "withpromise"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_completion_kinds() {
        assert!(!Completion::done().is_pending());
        assert!(Completion::pending(async { anyhow::Ok(()) }).is_pending());
        assert!(matches!(Completion::from(()), Completion::Done));
    }

    #[test]
    fn test_loader_requires_file_and_registration() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nopromise.rs"), "").unwrap();
        fs::write(dir.path().join("nested/deep.rs"), "").unwrap();
        fs::write(dir.path().join("orphan.rs"), "").unwrap();

        let registry = SpecRegistry::new().register("nopromise", noop).register("nested/deep", noop);
        let loader = RegistrySpecLoader::new(dir.path(), registry);

        assert!(loader.load_spec(&dir.path().join("nopromise.rs")).is_ok());
        assert!(loader.load_spec(&dir.path().join("nested/deep.rs")).is_ok());
        assert!(matches!(
            loader.load_spec(&dir.path().join("orphan.rs")),
            Err(LoadError::Unregistered(key)) if key == "orphan"
        ));
        assert!(matches!(
            loader.load_spec(&dir.path().join("ghost.rs")),
            Err(LoadError::NotFound(_))
        ));
    }
}
