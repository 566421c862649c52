#![forbid(unsafe_code)]
// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
//! specrig: a fixture-driven test harness bootstrapper
//!
//! Point specrig at a test directory holding a `spec/` and a `fixture/` folder. It selects spec files, builds a fresh
//! fixture context for each one by deep-merging the configured global fixtures and the spec's own local fixture,
//! runs the spec with an assertion handle, and streams every assertion to a reporter.
//!
//! ## Layout
//!
//! - [`selector`] - explicit spec names or recursive discovery
//! - [`fixture`] - fixture loading (files and registered factories) and the merge engine
//! - [`spec`] - compiled-in spec modules and their completion values
//! - [`runner`] - the per-unit state machine
//! - [`assertion`] / [`events`] - the assertion handle and the record stream it feeds
//! - [`module`] - module keys and data-file resolution shared by fixtures and specs
//! - [`aggregate`] / [`reporter`] - result aggregation and the reporter sinks
//! - [`harness`] - wires one run together
//! - [`cli`] - argument parsing and process exit handling
//!
//! ## Panic Policy
//!
//! - **Production code**: errors are `Result`s; the crate denies `clippy::unwrap_used` and `clippy::expect_used`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//! - **Spec and fixture code**: user code may panic. Panics are captured and reported as failing assertions.

pub mod aggregate;
pub mod assertion;
pub mod cli;
pub mod config;
pub mod events;
pub mod fixture;
pub mod harness;
pub mod module;
pub mod reporter;
pub mod runner;
pub mod selector;
pub mod spec;

pub use aggregate::{ResultAggregator, RunSummary};
pub use assertion::TestHandle;
pub use config::HarnessConfig;
pub use events::{AssertionResult, Operator, TestRecord};
pub use fixture::{FixtureContext, FixtureRegistry};
pub use harness::{Harness, HarnessError, HarnessRun};
pub use reporter::{CollectingReporter, Reporter, SharedBuffer};
pub use runner::{Settlement, UnitReport, UnitState};
pub use spec::{Completion, SpecRegistry};

// Value model used by fixtures and assertions
pub use specrig_core::{Map, Value};
