//! Newline-delimited JSON reporter
//!
//! Each record is written as one JSON object carrying a `type` tag (`test`, `assert`, `comment`, `end`). The last
//! line is `{"type":"summary","total":..,"pass":..,"fail":..}`.

use std::io::{self, Write};

use serde::Serialize;

use super::{Output, Reporter};
use crate::aggregate::RunSummary;
use crate::events::TestRecord;

pub struct JsonReporter {
    out: Output,
}

#[derive(Serialize)]
struct SummaryLine<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    summary: &'a RunSummary,
}

impl JsonReporter {
    pub fn new(out: Output) -> Self {
        Self { out }
    }

    fn line<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        writeln!(self.out)
    }
}

impl Reporter for JsonReporter {
    fn record(&mut self, record: &TestRecord) -> io::Result<()> {
        self.line(record)
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        self.line(&SummaryLine { kind: "summary", summary })?;
        self.out.flush()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::reporter::SharedBuffer;
    use serde_json::{Value, json};

    #[test]
    fn test_one_object_per_line() {
        let buffer = SharedBuffer::default();
        let mut reporter = JsonReporter::new(Box::new(buffer.clone()));
        reporter.record(&TestRecord::Test { id: 0, name: "a".into() }).unwrap();
        reporter.record(&TestRecord::End { test: 0 }).unwrap();
        reporter.finish(&RunSummary { total: 3, pass: 2, fail: 1 }).unwrap();

        let lines: Vec<Value> = buffer
            .contents()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                json!({"type": "test", "id": 0, "name": "a"}),
                json!({"type": "end", "test": 0}),
                json!({"type": "summary", "total": 3, "pass": 2, "fail": 1}),
            ]
        );
    }
}
