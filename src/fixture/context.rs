//! The merged per-test fixture context

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Merged fixture data for one test unit.
///
/// Built fresh for every unit and moved into the spec, so no two units ever observe the same context.
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FixtureContext {
    values: Map<String, Value>,
}

impl FixtureContext {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Look up a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Look up a nested value by RFC 6901 JSON pointer (`/db/port`, `/a~1b` for key `a/b`).
    ///
    /// The empty pointer would address the whole context, which is not a single value, so it yields `None`, as does
    /// any pointer without a leading `/`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let tail = pointer.strip_prefix('/')?;
        let (head, rest) = match tail.find('/') {
            Some(at) => tail.split_at(at),
            None => (tail, ""),
        };
        let key = head.replace("~1", "/").replace("~0", "~");
        self.values.get(&key)?.pointer(rest)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Deserialize the whole context into a typed struct.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(Value::Object(self.values.clone()))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}

impl From<Map<String, Value>> for FixtureContext {
    fn from(values: Map<String, Value>) -> Self {
        Self::new(values)
    }
}
