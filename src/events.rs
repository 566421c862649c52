//! The record stream between assertion handles and the aggregator
//!
//! Every assertion made anywhere in a run becomes one [`TestRecord::Assert`] on a single ordered channel. Unit
//! boundaries are marked with `test`/`end` records, the same row shapes a tape object stream carries, so reporters
//! that render per-test sections have something to hang them on.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

/// The kind of assertion that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Pass,
    Fail,
    Ok,
    NotOk,
    Equal,
    NotEqual,
    /// A spec completion that settled with an error, or panicked
    Error,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Pass => "pass",
            Operator::Fail => "fail",
            Operator::Ok => "ok",
            Operator::NotOk => "not_ok",
            Operator::Equal => "equal",
            Operator::NotEqual => "not_equal",
            Operator::Error => "error",
        }
    }
}

/// Result of a single assertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssertionResult {
    /// Run-wide assertion number, starting at 1
    pub id: usize,
    /// Id of the unit that made the assertion
    pub test: usize,
    pub ok: bool,
    pub operator: Operator,
    /// The assertion message
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
}

/// One row of the result stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestRecord {
    /// A unit started
    Test { id: usize, name: String },
    Assert(AssertionResult),
    Comment { test: usize, text: String },
    /// A unit finished
    End { test: usize },
}

impl TestRecord {
    pub fn as_assertion(&self) -> Option<&AssertionResult> {
        match self {
            TestRecord::Assert(result) => Some(result),
            _ => None,
        }
    }
}

/// Message carried on the record channel.
#[derive(Debug)]
pub enum Signal {
    Record(TestRecord),
    /// All units have completed; the aggregator may finalize
    AllFinished,
}

/// Sending half of the record stream, shared by every handle of a run.
#[derive(Debug, Clone)]
pub struct RecordSink {
    tx: mpsc::UnboundedSender<Signal>,
    next_test: Arc<AtomicUsize>,
    next_assert: Arc<AtomicUsize>,
}

/// Receiving half of the record stream.
pub type RecordStream = mpsc::UnboundedReceiver<Signal>;

/// Create a connected sink/stream pair.
pub fn channel() -> (RecordSink, RecordStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink = RecordSink {
        tx,
        next_test: Arc::new(AtomicUsize::new(0)),
        next_assert: Arc::new(AtomicUsize::new(1)),
    };
    (sink, rx)
}

impl RecordSink {
    /// Allocate the next unit id.
    pub fn next_test_id(&self) -> usize {
        self.next_test.fetch_add(1, Ordering::Relaxed)
    }

    /// Allocate the next assertion id.
    pub fn next_assert_id(&self) -> usize {
        self.next_assert.fetch_add(1, Ordering::Relaxed)
    }

    pub fn emit(&self, record: TestRecord) {
        if self.tx.send(Signal::Record(record)).is_err() {
            tracing::debug!("record stream closed, dropping record");
        }
    }

    /// Signal that no more units will run.
    pub fn finish(&self) {
        if self.tx.send(Signal::AllFinished).is_err() {
            tracing::debug!("record stream closed before finish signal");
        }
    }
}
