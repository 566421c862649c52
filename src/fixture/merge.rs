//! The fixture merge engine
//!
//! ## Merge order
//!
//! 1. global fixtures, in configured order (later overrides earlier)
//! 2. the local fixture named after the spec file (overrides every global)
//!
//! Keys collide through [`specrig_core::merge_map`]: mappings merge recursively, anything else is replaced.

use std::path::Path;

use serde_json::Map;
use specrig_core::merge_map;

use super::context::FixtureContext;
use super::loader::{FixtureLoader, FixtureScope, load_fixture};
use crate::assertion::TestHandle;
use crate::module;

/// Builds the fixture context for one unit.
pub struct FixtureMerger<'a, L: FixtureLoader + ?Sized> {
    loader: &'a L,
    fixture_root: &'a Path,
}

impl<'a, L: FixtureLoader + ?Sized> FixtureMerger<'a, L> {
    pub fn new(loader: &'a L, fixture_root: &'a Path) -> Self {
        Self { loader, fixture_root }
    }

    /// Merge `globals` then the local fixture for `spec_path` into a fresh context.
    ///
    /// The local fixture is looked up by the spec's file name without `.rs`, so `spec/nopromise.rs` picks up
    /// `fixture/nopromise.json` (or `.toml`, or a factory registered as `nopromise`) and `spec/a.b.rs` picks up `a.b`.
    pub fn merge(&self, globals: &[String], spec_path: &Path, handle: &TestHandle) -> FixtureContext {
        let mut acc = Map::new();

        for name in globals {
            let path = self.fixture_root.join(name);
            merge_map(&mut acc, load_fixture(self.loader, &path, handle, FixtureScope::Global));
        }

        let local = self.fixture_root.join(module::base_name(spec_path));
        merge_map(&mut acc, load_fixture(self.loader, &local, handle, FixtureScope::Local));

        tracing::debug!(keys = acc.len(), spec = %spec_path.display(), "fixture context built");
        FixtureContext::new(acc)
    }
}
