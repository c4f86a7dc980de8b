//! Form fields -> structure
//!
//! [`unflatten`] rebuilds a nested value from an ordered mapping of dot-path
//! keys to submitted text, the shape a browser form posts. Processing is in
//! input order:
//!
//! 1. Empty values are skipped; they never create keys.
//! 2. Each value goes through [`coerce_field`]: a final segment named `id`
//!    (any case) holding only decimal digits becomes a number, bracketed text
//!    is parsed as JSON and then as a relaxed literal, anything else stays a
//!    string.
//! 3. Intermediate segments are walked, creating objects. A segment that
//!    already holds a leaf is replaced by an empty object: later structure
//!    wins over an earlier leaf sharing its prefix.
//! 4. The coerced value is assigned at the final segment.
//!
//! Under [`ContainerPolicy::RestoreArrays`] (the default), a rebuilt container
//! whose keys are exactly `0..n` becomes an array; any gap or non-numeric key
//! leaves it an object.
//!
//! ```
//! use docpath_core::unflatten::unflatten;
//! use serde_json::json;
//!
//! let value = unflatten([("patient.id", "42"), ("tags", "['x','y']")]).unwrap();
//! assert_eq!(value, json!({"patient": {"id": 42}, "tags": ["x", "y"]}));
//! ```

use crate::error::{Error, Result};
use crate::flatten::FlatRecord;
use crate::literal::parse_literal;
use crate::path::{parse_index, DocPath};
use crate::value::{Object, Value, ValueExt, MAX_NESTING_DEPTH};
use serde::{Deserialize, Serialize};
use tracing::debug;

// =============================================================================
// Type inference
// =============================================================================

/// Which inference branch produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Strict JSON parse of bracketed text
    ParsedAsStructured,
    /// Relaxed literal parse of bracketed text
    ParsedAsLiteral,
    /// Kept as the submitted string
    KeptAsString,
    /// Digits under an `id` key, coerced to a number
    NumericId,
}

/// A coerced value and the branch that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    /// The resulting value
    pub value: Value,
    /// How it was obtained
    pub provenance: Provenance,
}

impl Coerced {
    fn kept(raw: &str) -> Self {
        Coerced {
            value: Value::String(raw.to_string()),
            provenance: Provenance::KeptAsString,
        }
    }
}

/// Infer a value from submitted text
///
/// Only text that is bracketed after trimming (`{...}` or `[...]`) is parsed.
/// A failed parse is not an error: the raw text is kept as a string.
pub fn infer_value(raw: &str) -> Coerced {
    let trimmed = raw.trim();
    let bracketed = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if !bracketed {
        return Coerced::kept(raw);
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.nesting_depth() <= MAX_NESTING_DEPTH {
            return Coerced {
                value,
                provenance: Provenance::ParsedAsStructured,
            };
        }
    }

    match parse_literal(trimmed) {
        Ok(value) => Coerced {
            value,
            provenance: Provenance::ParsedAsLiteral,
        },
        Err(e) => {
            debug!(error = %e, "bracketed field kept as string");
            Coerced::kept(raw)
        }
    }
}

/// Coerce one submitted field whose final path segment is `last_segment`
pub fn coerce_field(last_segment: &str, raw: &str) -> Coerced {
    if last_segment.eq_ignore_ascii_case("id")
        && !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
    {
        if let Ok(n) = raw.parse::<u64>() {
            return Coerced {
                value: Value::from(n),
                provenance: Provenance::NumericId,
            };
        }
    }
    infer_value(raw)
}

// =============================================================================
// Re-nesting
// =============================================================================

/// How rebuilt containers are materialised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerPolicy {
    /// Containers keyed exactly `0..n` become arrays
    #[default]
    RestoreArrays,
    /// Every rebuilt container is an object
    ObjectsOnly,
}

/// Per-field outcome of [`unflatten_with_report`]
#[derive(Debug, Clone, PartialEq)]
pub struct FieldReport {
    /// The submitted key
    pub field: String,
    /// How its value was obtained
    pub provenance: Provenance,
}

/// Result of [`unflatten_with_report`]
#[derive(Debug, Clone, PartialEq)]
pub struct Unflattened {
    /// The rebuilt value; always an object at the root
    pub value: Value,
    /// One entry per non-empty field, in input order
    pub report: Vec<FieldReport>,
}

/// Rebuild a value from form fields with the default policy
pub fn unflatten<I, K, V>(fields: I) -> Result<Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    unflatten_with_report(fields, ContainerPolicy::default()).map(|u| u.value)
}

/// Rebuild a value from form fields, reporting how each field was coerced
pub fn unflatten_with_report<I, K, V>(fields: I, policy: ContainerPolicy) -> Result<Unflattened>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut root = Node::default();
    let mut report = Vec::new();

    for (key, raw) in fields {
        let (key, raw) = (key.as_ref(), raw.as_ref());
        if raw.is_empty() {
            continue;
        }
        let path = parse_field_path(key)?;
        let last = path.last_segment().map(|s| s.as_str()).unwrap_or_default();
        let coerced = coerce_field(last, raw);
        root.insert(&path, coerced.value);
        report.push(FieldReport {
            field: key.to_string(),
            provenance: coerced.provenance,
        });
    }

    Ok(Unflattened {
        value: root.into_object(policy),
        report,
    })
}

/// Re-nest a flat record without coercion
///
/// The inverse of [`crate::flatten::flatten`] for values whose keys contain no
/// `.` and whose containers are non-empty.
pub fn unflatten_record(record: &FlatRecord) -> Result<Value> {
    let mut root = Node::default();
    for (key, value) in record.iter() {
        let path = parse_field_path(key)?;
        root.insert(&path, value.clone());
    }
    Ok(root.into_value(ContainerPolicy::RestoreArrays))
}

fn parse_field_path(key: &str) -> Result<DocPath> {
    let path: DocPath = key.parse()?;
    if path.is_root() {
        return Err(Error::invalid_input("field name is empty"));
    }
    path.validate()?;
    Ok(path)
}

/// Build tree: a node is a leaf when `leaf` is set, otherwise a container
#[derive(Debug, Default)]
struct Node {
    leaf: Option<Value>,
    children: Vec<(String, Node)>,
}

impl Node {
    fn insert(&mut self, path: &DocPath, value: Value) {
        let mut current = self;
        for segment in path.segments() {
            current = current.child_mut(segment.as_str());
        }
        current.leaf = Some(value);
        current.children.clear();
    }

    fn child_mut(&mut self, key: &str) -> &mut Node {
        if let Some(leaf) = self.leaf.take() {
            match leaf {
                // A parsed object literal keeps its keys and gains new ones.
                Value::Object(map) => {
                    self.children = map
                        .into_iter()
                        .map(|(k, v)| (k, Node::from_leaf(v)))
                        .collect();
                }
                other => {
                    debug!(key, replaced = other.kind_name(), "leaf overwritten by nested field");
                    self.children.clear();
                }
            }
        }
        let idx = match self.children.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.children.push((key.to_string(), Node::default()));
                self.children.len() - 1
            }
        };
        &mut self.children[idx].1
    }

    fn from_leaf(value: Value) -> Self {
        Node {
            leaf: Some(value),
            children: Vec::new(),
        }
    }

    /// Materialise as an object regardless of policy; used for the form root
    fn into_object(self, policy: ContainerPolicy) -> Value {
        let mut obj = Object::new();
        for (key, child) in self.children {
            obj.insert(key, child.into_value(policy));
        }
        Value::Object(obj)
    }

    fn into_value(self, policy: ContainerPolicy) -> Value {
        if let Some(leaf) = self.leaf {
            return leaf;
        }
        if policy == ContainerPolicy::RestoreArrays {
            if let Some(order) = contiguous_indices(&self.children) {
                let mut slots: Vec<Option<Value>> = vec![None; order.len()];
                for ((_, child), idx) in self.children.into_iter().zip(order) {
                    slots[idx] = Some(child.into_value(policy));
                }
                return Value::Array(slots.into_iter().flatten().collect());
            }
        }
        self.into_object(policy)
    }
}

/// Indices of `children` if their keys are exactly `0..n` in canonical form
fn contiguous_indices(children: &[(String, Node)]) -> Option<Vec<usize>> {
    if children.is_empty() {
        return None;
    }
    let n = children.len();
    let mut seen = vec![false; n];
    let mut order = Vec::with_capacity(n);
    for (key, _) in children {
        let idx = parse_index(key)?;
        if idx >= n || seen[idx] || idx.to_string() != *key {
            return None;
        }
        seen[idx] = true;
        order.push(idx);
    }
    Some(order)
}
