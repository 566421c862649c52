//! Result aggregation
//!
//! The aggregator is the single consumer of the record stream. It forwards each record to the reporter unchanged
//! and keeps the only [`RunSummary`] of the run. Records that arrive after the finish signal are never seen: the
//! aggregator drops the receiving half as soon as it finalizes.

use serde::Serialize;

use crate::events::{RecordStream, Signal, TestRecord};
use crate::reporter::Reporter;

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub pass: usize,
    pub fail: usize,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.fail == 0
    }
}

/// Counts assertion results and bridges them to a reporter.
pub struct ResultAggregator {
    reporter: Box<dyn Reporter>,
    summary: RunSummary,
    finished: bool,
}

impl ResultAggregator {
    pub fn new(reporter: Box<dyn Reporter>) -> Self {
        Self {
            reporter,
            summary: RunSummary::default(),
            finished: false,
        }
    }

    /// Totals so far.
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Count and forward one record; ignored once finished.
    pub fn observe(&mut self, record: &TestRecord) {
        if self.finished {
            tracing::debug!("record after finish dropped");
            return;
        }
        if let Some(result) = record.as_assertion() {
            self.summary.total += 1;
            if result.ok {
                self.summary.pass += 1;
            } else {
                self.summary.fail += 1;
            }
        }
        if let Err(err) = self.reporter.record(record) {
            tracing::warn!(error = %err, "reporter failed to write record");
        }
    }

    /// Finalize the run and let the reporter print its summary. Idempotent.
    pub fn finish(&mut self) -> RunSummary {
        if !self.finished {
            self.finished = true;
            if let Err(err) = self.reporter.finish(&self.summary) {
                tracing::warn!(error = %err, "reporter failed to write summary");
            }
        }
        self.summary
    }

    /// Consume the stream until the finish signal (or until every sender is gone).
    pub async fn drive(mut self, mut stream: RecordStream) -> RunSummary {
        while let Some(signal) = stream.recv().await {
            match signal {
                Signal::Record(record) => self.observe(&record),
                Signal::AllFinished => break,
            }
        }
        stream.close();
        let summary = self.finish();
        tracing::debug!(total = summary.total, pass = summary.pass, fail = summary.fail, "run finished");
        summary
    }
}
