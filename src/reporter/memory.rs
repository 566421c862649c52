//! In-memory sinks for embedding the harness
//!
//! [`CollectingReporter`] keeps every record and the final summary; clones share the same storage, so a caller can
//! hand one clone to the harness and inspect another afterwards. [`SharedBuffer`] does the same for raw reporter
//! output.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::Reporter;
use crate::aggregate::RunSummary;
use crate::events::{AssertionResult, TestRecord};

#[derive(Debug, Default)]
struct Collected {
    records: Vec<TestRecord>,
    summary: Option<RunSummary>,
    finish_calls: usize,
}

/// Reporter that stores what it receives.
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    inner: Arc<Mutex<Collected>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Collected> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every record received so far.
    pub fn records(&self) -> Vec<TestRecord> {
        self.lock().records.clone()
    }

    /// Only the assertion records.
    pub fn assertions(&self) -> Vec<AssertionResult> {
        self.lock().records.iter().filter_map(TestRecord::as_assertion).cloned().collect()
    }

    pub fn summary(&self) -> Option<RunSummary> {
        self.lock().summary
    }

    pub fn finish_calls(&self) -> usize {
        self.lock().finish_calls
    }
}

impl Reporter for CollectingReporter {
    fn record(&mut self, record: &TestRecord) -> io::Result<()> {
        self.lock().records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        let mut collected = self.lock();
        collected.summary = Some(*summary);
        collected.finish_calls += 1;
        Ok(())
    }
}

/// A cloneable `Write` target backed by one shared byte buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_storage() {
        let reporter = CollectingReporter::new();
        let mut writer = reporter.clone();
        writer.record(&TestRecord::End { test: 0 }).unwrap();
        writer.finish(&RunSummary::default()).unwrap();

        assert_eq!(reporter.records(), vec![TestRecord::End { test: 0 }]);
        assert_eq!(reporter.summary(), Some(RunSummary::default()));
        assert!(reporter.assertions().is_empty());
    }

    #[test]
    fn test_shared_buffer_collects_writes() {
        let buffer = SharedBuffer::default();
        let mut a = buffer.clone();
        write!(a, "one ").unwrap();
        write!(buffer.clone(), "two").unwrap();
        assert_eq!(buffer.contents(), "one two");
    }
}
