//! Structure -> flat record
//!
//! [`flatten`] turns any nested value into a [`FlatRecord`]: canonical dot-paths
//! mapped to leaf values, in depth-first, key-then-index order. Empty objects
//! and empty arrays contribute no entries.
//!
//! ```
//! use docpath_core::flatten::flatten;
//! use serde_json::json;
//!
//! let flat = flatten(&json!({"a": {"b": 1, "c": [2, 3]}})).unwrap();
//! let keys: Vec<&str> = flat.keys().collect();
//! assert_eq!(keys, vec!["a.b", "a.c.0", "a.c.1"]);
//! ```

use crate::value::{LimitError, Object, Value, ValueExt, MAX_NESTING_DEPTH};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Key used when a bare leaf is flattened with no enclosing container
pub const DEFAULT_LEAF_KEY: &str = "value";

/// Flat path-string -> leaf mapping, in traversal order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatRecord(Object);

impl FlatRecord {
    /// Empty record
    pub fn new() -> Self {
        FlatRecord(Object::new())
    }

    /// Leaf at a flat key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert or overwrite an entry
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flat keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Leaves rendered as form text, the shape a browser submits back
    pub fn to_form_fields(&self) -> Vec<(String, String)> {
        self.0.iter().map(|(k, v)| (k.clone(), v.to_text())).collect()
    }

    /// The record as a single-level object
    pub fn into_object(self) -> Object {
        self.0
    }
}

impl FromIterator<(String, Value)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        FlatRecord(iter.into_iter().collect())
    }
}

/// Flatten a value, using [`DEFAULT_LEAF_KEY`] for a bare leaf
pub fn flatten(value: &Value) -> Result<FlatRecord, LimitError> {
    flatten_with_leaf_key(value, DEFAULT_LEAF_KEY)
}

/// Flatten a value, naming a bare top-level leaf `leaf_key`
pub fn flatten_with_leaf_key(value: &Value, leaf_key: &str) -> Result<FlatRecord, LimitError> {
    let mut out = FlatRecord::new();
    // Explicit stack, children pushed in reverse so they pop in order.
    let mut stack: Vec<(String, &Value, usize)> = vec![(String::new(), value, 0)];

    while let Some((prefix, current, depth)) = stack.pop() {
        if depth > MAX_NESTING_DEPTH {
            return Err(LimitError::NestingTooDeep {
                depth,
                max: MAX_NESTING_DEPTH,
            });
        }
        match current {
            Value::Object(obj) => {
                for (key, child) in obj.iter().rev() {
                    stack.push((join_key(&prefix, key), child, depth + 1));
                }
            }
            Value::Array(arr) => {
                for (idx, child) in arr.iter().enumerate().rev() {
                    stack.push((join_key(&prefix, &idx.to_string()), child, depth + 1));
                }
            }
            leaf => {
                let key = if prefix.is_empty() {
                    leaf_key.to_string()
                } else {
                    prefix
                };
                out.insert(key, leaf.clone());
            }
        }
    }
    Ok(out)
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

// =============================================================================
// Tabular rows
// =============================================================================

/// True for a non-empty array whose first element is an object
///
/// This is the shape displayed as a table.
pub fn is_table(value: &Value) -> bool {
    matches!(value, Value::Array(arr) if matches!(arr.first(), Some(Value::Object(_))))
}

/// Flatten every element of an array into its own row
///
/// Leaf elements become a single-entry row under `leaf_key`. A non-array
/// value becomes a single row.
pub fn flatten_rows(value: &Value, leaf_key: &str) -> Result<Vec<FlatRecord>, LimitError> {
    match value {
        Value::Array(arr) => arr
            .iter()
            .map(|row| flatten_with_leaf_key(row, leaf_key))
            .collect(),
        other => Ok(vec![flatten_with_leaf_key(other, leaf_key)?]),
    }
}

/// Sorted union of all flat keys across `rows`
pub fn column_union(rows: &[FlatRecord]) -> Vec<String> {
    let columns: BTreeSet<&str> = rows.iter().flat_map(|r| r.keys()).collect();
    columns.into_iter().map(str::to_string).collect()
}
