//! Provide the value model helpers shared by the specrig fixture engine.
//!
//! Fixture data is held in a dynamically typed model (`serde_json::Value`): mappings, arrays and scalars. This crate
//! owns the two pure operations the engine needs on that model:
//! - a recursive deep merge where mappings merge key by key and everything else is replaced wholesale, and
//! - a value-kind classification used to explain why a value was rejected as a fixture.
//!
//! ## Notes
//!
//! - No IO, no global state. Everything here is deterministic and testable without loading a single fixture.

pub mod kind;
pub mod merge;

pub use kind::{ValueKind, describe};
pub use merge::{deep_merge, merge_all, merge_map};

/// Re-export of the value model so downstream crates name one type.
pub use serde_json::{Map, Value};
