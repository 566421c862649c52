//! Deep merge over the dynamic value model.
//!
//! ## Rules
//!
//! - mapping onto mapping: merge key by key, recursing where both sides hold a mapping
//! - anything else (arrays, strings, numbers, booleans, `null`): the source value replaces the target
//!
//! Unlike JSON merge-patch, `null` is an ordinary value here and never deletes a key.

use serde_json::{Map, Value};

/// Merge `source` into `target`, with `source` winning on conflict.
///
/// ## Examples
///
/// ```
/// use serde_json::json;
/// use specrig_core::deep_merge;
///
/// let mut target = json!({"db": {"host": "localhost", "port": 5432}, "tags": [1, 2]});
/// deep_merge(&mut target, json!({"db": {"port": 6543}, "tags": [3]}));
/// assert_eq!(target, json!({"db": {"host": "localhost", "port": 6543}, "tags": [3]}));
/// ```
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => merge_map(target_map, source_map),
        (target, source) => *target = source,
    }
}

/// Merge the entries of `source` into the mapping `target`.
pub fn merge_map(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match target.get_mut(&key) {
            Some(existing) => deep_merge(existing, value),
            None => {
                target.insert(key, value);
            }
        }
    }
}

/// Fold an ordered sequence of mappings into one, later mappings overriding earlier ones.
pub fn merge_all<I>(layers: I) -> Map<String, Value>
where
    I: IntoIterator<Item = Map<String, Value>>,
{
    layers.into_iter().fold(Map::new(), |mut acc, layer| {
        merge_map(&mut acc, layer);
        acc
    })
}
