//! Value-kind vocabulary for fixture validation messages.

use std::fmt;

use serde_json::Value;

/// Longest value rendering embedded in a message before it is elided.
const MAX_DESCRIBE_LEN: usize = 80;

/// Represent the top-level kind of a dynamic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Mapping,
}

impl ValueKind {
    /// Classify a value by its top-level variant.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Mapping,
        }
    }

    /// Canonical lowercase name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Mapping => "mapping",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a value compactly for a diagnostic, eliding long renderings.
///
/// Strings render without quotes.
pub fn describe(value: &Value) -> String {
    let rendered = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if rendered.chars().count() <= MAX_DESCRIBE_LEN {
        return rendered;
    }
    let mut short: String = rendered.chars().take(MAX_DESCRIBE_LEN).collect();
    short.push('…');
    short
}
