//! Reporter sinks
//!
//! A reporter receives every record of the run in occurrence order, then the final summary once. Reporters write to
//! an owned `Write` handle so tests can capture output.
//!
//! ## Built-in reporters
//!
//! | identifier       | output                                           |
//! |------------------|--------------------------------------------------|
//! | `pretty`         | colored per-test console output (default)        |
//! | `tap`, `none`    | TAP version 13                                   |
//! | `json`           | one JSON record per line, then a summary line    |
//!
//! An unknown identifier logs a warning and falls back to TAP.

pub mod console;
pub mod json;
pub mod memory;
pub mod tap;

use std::io::{self, Write};

use crate::aggregate::RunSummary;
use crate::events::TestRecord;

pub use console::PrettyReporter;
pub use json::JsonReporter;
pub use memory::{CollectingReporter, SharedBuffer};
pub use tap::TapReporter;

/// Identifier of the reporter used when none is configured.
pub const DEFAULT_REPORTER: &str = "pretty";

/// Output sink for a run.
pub trait Reporter: Send {
    /// Called once per record, in stream order
    fn record(&mut self, record: &TestRecord) -> io::Result<()>;

    /// Called once after the last record
    fn finish(&mut self, summary: &RunSummary) -> io::Result<()>;
}

/// Writer a built-in reporter prints to.
pub type Output = Box<dyn Write + Send>;

/// Build a built-in reporter by identifier.
pub fn resolve(identifier: Option<&str>, out: Output) -> Box<dyn Reporter> {
    match identifier.unwrap_or(DEFAULT_REPORTER) {
        "pretty" => Box::new(PrettyReporter::new(out, console::color_enabled())),
        "tap" | "none" => Box::new(TapReporter::new(out)),
        "json" => Box::new(JsonReporter::new(out)),
        other => {
            tracing::warn!("unknown reporter '{other}', falling back to tap");
            Box::new(TapReporter::new(out))
        }
    }
}

/// Build a built-in reporter writing to stdout.
pub fn resolve_stdout(identifier: Option<&str>) -> Box<dyn Reporter> {
    resolve(identifier, Box::new(io::stdout()))
}
