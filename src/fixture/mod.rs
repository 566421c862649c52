//! Fixture resolution
//!
//! ## Modules
//!
//! - `loader` - resolve one fixture module (registry or data file) and normalize it
//! - `merge` - fold global and local fixtures into a [`FixtureContext`]
//! - `context` - the merged per-unit context handed to a spec

pub mod context;
pub mod loader;
pub mod merge;

pub use context::FixtureContext;
pub use loader::{Factory, FixtureLoader, FixtureModule, FixtureRegistry, FixtureScope, FixtureSources, load_fixture};
pub use merge::FixtureMerger;
