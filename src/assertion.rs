//! The assertion handle passed into specs and fixture factories
//!
//! A [`TestHandle`] belongs to one unit. Each assertion call turns into exactly one
//! [`TestRecord::Assert`](crate::events::TestRecord) on the run's record stream, in call order. Handles are cheap to
//! clone so async spec bodies can move them into futures.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::events::{AssertionResult, Operator, RecordSink, TestRecord};

/// Assertion capability for one test unit.
#[derive(Debug, Clone)]
pub struct TestHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    id: usize,
    name: String,
    sink: RecordSink,
}

impl TestHandle {
    pub(crate) fn new(id: usize, name: impl Into<String>, sink: RecordSink) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id,
                name: name.into(),
                sink,
            }),
        }
    }

    /// Unit id this handle reports under.
    pub fn id(&self) -> usize {
        self.inner.id
    }

    /// Display name of the unit: the spec's absolute path.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Record an unconditional pass.
    pub fn pass(&self, msg: impl Into<String>) {
        self.record(true, Operator::Pass, msg.into(), None, None);
    }

    /// Record an unconditional failure.
    pub fn fail(&self, msg: impl Into<String>) {
        self.record(false, Operator::Fail, msg.into(), None, None);
    }

    /// Assert that `cond` holds.
    pub fn ok(&self, cond: bool, msg: impl Into<String>) -> bool {
        self.record(cond, Operator::Ok, msg.into(), Some(Value::Bool(cond)), Some(Value::Bool(true)));
        cond
    }

    /// Assert that `cond` does not hold.
    pub fn not_ok(&self, cond: bool, msg: impl Into<String>) -> bool {
        self.record(!cond, Operator::NotOk, msg.into(), Some(Value::Bool(cond)), Some(Value::Bool(false)));
        !cond
    }

    /// Assert deep equality of two values, compared in the value model.
    ///
    /// Anything `Serialize` works on either side, so fixture lookups compare directly against literals:
    /// `t.equal(ctx.get("fixtureKey"), "nopromise", "...")`.
    pub fn equal<A, E>(&self, actual: A, expected: E, msg: impl Into<String>) -> bool
    where
        A: Serialize,
        E: Serialize,
    {
        self.compare(actual, expected, msg.into(), Operator::Equal)
    }

    /// Assert two values differ.
    pub fn not_equal<A, E>(&self, actual: A, expected: E, msg: impl Into<String>) -> bool
    where
        A: Serialize,
        E: Serialize,
    {
        self.compare(actual, expected, msg.into(), Operator::NotEqual)
    }

    /// Emit a comment line on the stream. Comments are not assertions.
    pub fn comment(&self, text: impl Into<String>) {
        self.inner.sink.emit(TestRecord::Comment {
            test: self.inner.id,
            text: text.into(),
        });
    }

    /// Record the failure of a spec completion that settled with an error.
    pub(crate) fn record_rejection(&self, err: &anyhow::Error) {
        self.record(false, Operator::Error, format!("{err:#}"), None, None);
    }

    /// Record a panic raised by spec code.
    pub(crate) fn record_panic(&self, message: &str) {
        self.record(false, Operator::Error, format!("spec panicked: {message}"), None, None);
    }

    fn compare<A, E>(&self, actual: A, expected: E, msg: String, operator: Operator) -> bool
    where
        A: Serialize,
        E: Serialize,
    {
        let (actual, expected) = match (serde_json::to_value(actual), serde_json::to_value(expected)) {
            (Ok(a), Ok(e)) => (a, e),
            (Err(err), _) | (_, Err(err)) => {
                self.record(false, operator, format!("{msg} (value not comparable: {err})"), None, None);
                return false;
            }
        };
        let ok = match operator {
            Operator::NotEqual => actual != expected,
            _ => actual == expected,
        };
        self.record(ok, operator, msg, Some(actual), Some(expected));
        ok
    }

    fn record(&self, ok: bool, operator: Operator, name: String, actual: Option<Value>, expected: Option<Value>) {
        let id = self.inner.sink.next_assert_id();
        tracing::trace!(test = self.inner.id, assert = id, ok, operator = operator.as_str(), "assertion");
        self.inner.sink.emit(TestRecord::Assert(AssertionResult {
            id,
            test: self.inner.id,
            ok,
            operator,
            name,
            actual,
            expected,
        }));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::events::{self, RecordStream, Signal};
    use serde_json::json;

    fn drain(rx: &mut RecordStream) -> Vec<AssertionResult> {
        let mut out = Vec::new();
        while let Ok(signal) = rx.try_recv() {
            if let Signal::Record(TestRecord::Assert(result)) = signal {
                out.push(result);
            }
        }
        out
    }

    #[test]
    fn test_pass_and_fail_record_in_order() {
        let (sink, mut rx) = events::channel();
        let t = TestHandle::new(7, "unit", sink);
        t.pass("first");
        t.fail("second");

        let results = drain(&mut rx);
        assert_eq!(results.len(), 2);
        assert_eq!((results[0].id, results[0].ok, results[0].test), (1, true, 7));
        assert_eq!((results[1].id, results[1].ok), (2, false));
        assert_eq!(results[1].operator, Operator::Fail);
    }

    #[test]
    fn test_equal_compares_in_value_model() {
        let (sink, mut rx) = events::channel();
        let t = TestHandle::new(0, "unit", sink);
        let fixture = json!({"fixtureKey": "nopromise"});

        assert!(t.equal(fixture.get("fixtureKey"), "nopromise", "present"));
        assert!(!t.equal(fixture.get("missing"), "nopromise", "absent"));
        assert!(t.equal(vec![1, 2], json!([1, 2]), "deep"));

        let results = drain(&mut rx);
        assert!(results[0].ok);
        assert!(!results[1].ok);
        assert_eq!(results[1].actual, Some(Value::Null));
        assert_eq!(results[1].expected, Some(json!("nopromise")));
        assert!(results[2].ok);
    }

    #[test]
    fn test_ok_not_ok_and_not_equal() {
        let (sink, mut rx) = events::channel();
        let t = TestHandle::new(0, "unit", sink);
        assert!(t.ok(true, "truthy"));
        assert!(t.not_ok(false, "falsy"));
        assert!(t.not_equal(1, 2, "differ"));
        assert!(!t.not_equal("a", "a", "same"));

        let oks: Vec<bool> = drain(&mut rx).iter().map(|r| r.ok).collect();
        assert_eq!(oks, vec![true, true, true, false]);
    }

    #[test]
    fn test_rejection_is_a_failing_error_assertion() {
        let (sink, mut rx) = events::channel();
        let t = TestHandle::new(0, "unit", sink);
        t.record_rejection(&anyhow::anyhow!("timer exploded"));

        let results = drain(&mut rx);
        assert_eq!(results.len(), 1);
        assert!(!results[0].ok);
        assert_eq!(results[0].operator, Operator::Error);
        assert_eq!(results[0].name, "timer exploded");
    }

    #[test]
    fn test_comment_is_not_an_assertion() {
        let (sink, mut rx) = events::channel();
        let t = TestHandle::new(0, "unit", sink);
        t.comment("just saying");
        assert!(drain(&mut rx).is_empty());
    }
}
