//! TAP version 13 output
//!
//! ```text
//! TAP version 13
//! # /work/tests/spec/nopromise.rs
//! ok 1 should pass
//! not ok 2 should fail
//!   ---
//!     operator: fail
//!   ...
//!
//! 1..2
//! # tests 2
//! # pass  1
//! # fail  1
//! ```

use std::io::{self, Write};

use serde_json::Value;

use super::{Output, Reporter};
use crate::aggregate::RunSummary;
use crate::events::{AssertionResult, TestRecord};

/// Plain TAP reporter.
pub struct TapReporter {
    out: Output,
    started: bool,
}

impl TapReporter {
    pub fn new(out: Output) -> Self {
        Self { out, started: false }
    }

    fn header(&mut self) -> io::Result<()> {
        if !self.started {
            self.started = true;
            writeln!(self.out, "TAP version 13")?;
        }
        Ok(())
    }

    fn assertion(&mut self, result: &AssertionResult) -> io::Result<()> {
        let status = if result.ok { "ok" } else { "not ok" };
        writeln!(self.out, "{status} {} {}", result.id, single_line(&result.name))?;
        if result.ok {
            return Ok(());
        }
        writeln!(self.out, "  ---")?;
        writeln!(self.out, "    operator: {}", result.operator.as_str())?;
        if let Some(expected) = &result.expected {
            writeln!(self.out, "    expected: {}", render(expected))?;
        }
        if let Some(actual) = &result.actual {
            writeln!(self.out, "    actual:   {}", render(actual))?;
        }
        writeln!(self.out, "  ...")
    }
}

impl Reporter for TapReporter {
    fn record(&mut self, record: &TestRecord) -> io::Result<()> {
        self.header()?;
        match record {
            TestRecord::Test { name, .. } => writeln!(self.out, "# {name}"),
            TestRecord::Assert(result) => self.assertion(result),
            TestRecord::Comment { text, .. } => {
                for line in text.lines() {
                    writeln!(self.out, "# {line}")?;
                }
                Ok(())
            }
            TestRecord::End { .. } => Ok(()),
        }
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        self.header()?;
        writeln!(self.out)?;
        writeln!(self.out, "1..{}", summary.total)?;
        writeln!(self.out, "# tests {}", summary.total)?;
        writeln!(self.out, "# pass  {}", summary.pass)?;
        if summary.fail > 0 {
            writeln!(self.out, "# fail  {}", summary.fail)?;
        } else {
            writeln!(self.out)?;
            writeln!(self.out, "# ok")?;
        }
        self.out.flush()
    }
}

/// A TAP test line must not span lines.
fn single_line(name: &str) -> String {
    name.replace(['\r', '\n'], " ")
}

fn render(value: &Value) -> String {
    value.to_string()
}
