//! Pretty console reporter (the default)

use std::env;
use std::io::{self, Write};
use std::time::Instant;

use super::{Output, Reporter};
use crate::aggregate::RunSummary;
use crate::events::{AssertionResult, TestRecord};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Whether ANSI colors should be used; `NO_COLOR` set to anything non-empty disables them.
pub fn color_enabled() -> bool {
    env::var_os("NO_COLOR").is_none_or(|value| value.is_empty())
}

/// Per-test sections with a check or cross per assertion, then a totals block.
pub struct PrettyReporter {
    out: Output,
    color: bool,
    started: Instant,
}

impl PrettyReporter {
    pub fn new(out: Output, color: bool) -> Self {
        Self {
            out,
            color,
            started: Instant::now(),
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn assertion(&mut self, result: &AssertionResult) -> io::Result<()> {
        if result.ok {
            let mark = self.paint(GREEN, "✔");
            let name = self.paint(DIM, &result.name);
            return writeln!(self.out, "  {mark} {name}");
        }

        let mark = self.paint(RED, "✖");
        let name = self.paint(RED, &result.name);
        writeln!(self.out, "  {mark} {name}")?;
        writeln!(self.out, "      operator: {}", result.operator.as_str())?;
        if let Some(expected) = &result.expected {
            writeln!(self.out, "      expected: {expected}")?;
        }
        if let Some(actual) = &result.actual {
            writeln!(self.out, "      actual:   {actual}")?;
        }
        Ok(())
    }
}

impl Reporter for PrettyReporter {
    fn record(&mut self, record: &TestRecord) -> io::Result<()> {
        match record {
            TestRecord::Test { name, .. } => {
                let title = self.paint(BOLD, name);
                writeln!(self.out)?;
                writeln!(self.out, "{title}")
            }
            TestRecord::Assert(result) => self.assertion(result),
            TestRecord::Comment { text, .. } => {
                let text = self.paint(DIM, text);
                writeln!(self.out, "  {text}")
            }
            TestRecord::End { .. } => Ok(()),
        }
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        let passing = self.paint(GREEN, &format!("passing:  {}", summary.pass));
        let failing = if summary.fail > 0 {
            self.paint(RED, &format!("failing:  {}", summary.fail))
        } else {
            format!("failing:  {}", summary.fail)
        };

        writeln!(self.out)?;
        writeln!(self.out, "  total:    {}", summary.total)?;
        writeln!(self.out, "  {passing}")?;
        writeln!(self.out, "  {failing}")?;
        writeln!(self.out, "  duration: {}ms", self.started.elapsed().as_millis())?;
        self.out.flush()
    }
}
