//! Dot-paths into nested values
//!
//! A [`DocPath`] is an ordered list of [`Segment`]s. A segment is a raw token
//! whose meaning is decided lazily against the value being traversed: it is an
//! object key when the current value is an Object and a zero-based index when
//! the current value is an Array. The same token `"3"` addresses key `"3"` in
//! an object and element 3 in an array.
//!
//! # Path Syntax
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | (empty) | Root |
//! | `a` | Key or index `a` |
//! | `a.b.0` | Segments `a`, `b`, `0` |
//!
//! A key containing a literal `.` cannot be addressed; there is no escaping.
//!
//! # Examples
//!
//! ```
//! use docpath_core::path::{resolve, DocPath};
//! use serde_json::json;
//!
//! let doc = json!({"visits": [{"date": "2024-01-02"}]});
//! let path: DocPath = "visits.0.date".parse().unwrap();
//! assert_eq!(resolve(&doc, &path), Some(&json!("2024-01-02")));
//! assert_eq!(path.parent().unwrap().to_string(), "visits.0");
//! ```

use crate::error::{Error, Result};
use crate::value::{LimitError, Object, Value, ValueExt, MAX_PATH_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Segment
// =============================================================================

/// One raw path token
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Segment(String);

impl Segment {
    /// Create a segment from a token
    pub fn new(token: impl Into<String>) -> Self {
        Segment(token.into())
    }

    /// The raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the token as a non-negative array index
    ///
    /// Only plain decimal digits qualify; signs and whitespace do not.
    pub fn as_index(&self) -> Option<usize> {
        parse_index(&self.0)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment(s.to_string())
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Segment(s)
    }
}

impl From<usize> for Segment {
    fn from(i: usize) -> Self {
        Segment(i.to_string())
    }
}

/// Parse a decimal token as an index
pub fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

// =============================================================================
// DocPath
// =============================================================================

/// Error type for path parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// Empty segment (leading, trailing or doubled dot)
    #[error("empty segment at position {0}")]
    EmptySegment(usize),
    /// A key token contains a dot
    #[error("key '{0}' contains '.', which cannot be addressed")]
    DottedKey(String),
}

/// A location inside a nested value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DocPath {
    segments: Vec<Segment>,
}

impl DocPath {
    /// The empty path; resolves to the root itself
    pub fn root() -> Self {
        DocPath {
            segments: Vec::new(),
        }
    }

    /// Create a path from segments
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        DocPath { segments }
    }

    /// The path segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for the root path
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True for the root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a segment (builder pattern)
    pub fn child(mut self, segment: impl Into<Segment>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Append a segment (mutating)
    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.segments.push(segment.into());
    }

    /// Concatenate another path onto this one
    pub fn join(&self, other: &DocPath) -> DocPath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        DocPath { segments }
    }

    /// The "go up" path
    ///
    /// Drops the last segment. A single-segment path has no parent: it sits
    /// directly under the document, which is navigated to separately. The
    /// root has no parent either.
    pub fn parent(&self) -> Option<DocPath> {
        if self.segments.len() <= 1 {
            return None;
        }
        let mut parent = self.clone();
        parent.segments.pop();
        Some(parent)
    }

    /// The last segment (None for root)
    pub fn last_segment(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// True if this path is a prefix of (or equal to) `other`
    pub fn is_ancestor_of(&self, other: &DocPath) -> bool {
        self.segments.len() <= other.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a == b)
    }

    /// Validate path length limit
    pub fn validate(&self) -> std::result::Result<(), LimitError> {
        let length = self.segments.len();
        if length > MAX_PATH_LENGTH {
            Err(LimitError::PathTooLong {
                length,
                max: MAX_PATH_LENGTH,
            })
        } else {
            Ok(())
        }
    }

    /// Dot-joined string form; empty for root
    pub fn to_path_string(&self) -> String {
        let mut out = String::new();
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(seg.as_str());
        }
        out
    }
}

impl FromStr for DocPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(DocPath::root());
        }
        let mut segments = Vec::new();
        let mut position = 0;
        for token in s.split('.') {
            if token.is_empty() {
                return Err(PathParseError::EmptySegment(position));
            }
            segments.push(Segment::new(token));
            position += token.len() + 1;
        }
        Ok(DocPath { segments })
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path_string())
    }
}

impl From<Segment> for DocPath {
    fn from(segment: Segment) -> Self {
        DocPath {
            segments: vec![segment],
        }
    }
}

/// Check that a token can be used as a single object key
pub fn validate_key(key: &str) -> std::result::Result<(), PathParseError> {
    if key.is_empty() {
        return Err(PathParseError::EmptySegment(0));
    }
    if key.contains('.') {
        return Err(PathParseError::DottedKey(key.to_string()));
    }
    Ok(())
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve `path` against `root`
///
/// Returns `None` as soon as a segment fails to match; never a partial result.
pub fn resolve<'a>(root: &'a Value, path: &DocPath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = step(current, segment)?;
    }
    Some(current)
}

/// Mutable counterpart of [`resolve`]
pub fn resolve_mut<'a>(root: &'a mut Value, path: &DocPath) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in path.segments() {
        current = match current {
            Value::Object(obj) => obj.get_mut(segment.as_str())?,
            Value::Array(arr) => arr.get_mut(segment.as_index()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Resolve or fail with `PathNotFound`
pub fn require<'a>(root: &'a Value, path: &DocPath) -> Result<&'a Value> {
    resolve(root, path).ok_or_else(|| Error::path_not_found(path))
}

fn step<'a>(current: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match current {
        Value::Object(obj) => obj.get(segment.as_str()),
        Value::Array(arr) => arr.get(segment.as_index()?),
        _ => None,
    }
}

// =============================================================================
// Path Mutation
// =============================================================================

fn mismatch(path: &DocPath, expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        path: path.to_string(),
        expected,
        found: found.kind_name(),
    }
}

/// Set `value` at `path`, creating missing intermediate objects
///
/// Array segments must address an existing element; the last segment may
/// also equal the array length, which appends. Traversing through a leaf is a
/// `TypeMismatch`. The root path replaces the whole value.
pub fn set_at_path(root: &mut Value, path: &DocPath, value: Value) -> Result<()> {
    let Some((last, parents)) = path.segments().split_last() else {
        *root = value;
        return Ok(());
    };

    let mut current = root;
    for (i, segment) in parents.iter().enumerate() {
        current = match current {
            Value::Object(obj) => obj
                .entry(segment.as_str())
                .or_insert_with(|| Value::Object(Object::new())),
            Value::Array(arr) => {
                let len = arr.len();
                match segment.as_index() {
                    Some(idx) if idx < len => &mut arr[idx],
                    _ => {
                        let prefix = DocPath::from_segments(path.segments()[..=i].to_vec());
                        return Err(Error::path_not_found(prefix));
                    }
                }
            }
            other => {
                let prefix = DocPath::from_segments(path.segments()[..i].to_vec());
                return Err(mismatch(&prefix, "container", other));
            }
        };
    }

    match current {
        Value::Object(obj) => {
            obj.insert(last.as_str().to_string(), value);
            Ok(())
        }
        Value::Array(arr) => match last.as_index() {
            Some(idx) if idx < arr.len() => {
                arr[idx] = value;
                Ok(())
            }
            Some(idx) if idx == arr.len() => {
                arr.push(value);
                Ok(())
            }
            _ => Err(Error::path_not_found(path)),
        },
        other => {
            let parent = DocPath::from_segments(parents.to_vec());
            Err(mismatch(&parent, "container", other))
        }
    }
}

/// Remove the value at `path`
///
/// Object keys are removed preserving sibling order; array elements are
/// removed and later elements shift down. A missing parent or key is a no-op
/// returning `None`.
pub fn unset_at_path(root: &mut Value, path: &DocPath) -> Result<Option<Value>> {
    let Some((last, parents)) = path.segments().split_last() else {
        return Err(Error::invalid_input("cannot unset the document root"));
    };
    let parent_path = DocPath::from_segments(parents.to_vec());
    let Some(parent) = resolve_mut(root, &parent_path) else {
        return Ok(None);
    };
    match parent {
        Value::Object(obj) => Ok(obj.shift_remove(last.as_str())),
        Value::Array(arr) => match last.as_index() {
            Some(idx) if idx < arr.len() => Ok(Some(arr.remove(idx))),
            _ => Ok(None),
        },
        other => Err(mismatch(&parent_path, "container", other)),
    }
}

/// Append `value` to the array at `path`
///
/// A missing target is created as a one-element array. Returns the new length.
pub fn push_at_path(root: &mut Value, path: &DocPath, value: Value) -> Result<usize> {
    match resolve_mut(root, path) {
        Some(Value::Array(arr)) => {
            arr.push(value);
            Ok(arr.len())
        }
        Some(other) => Err(mismatch(path, "array", other)),
        None => {
            set_at_path(root, path, Value::Array(vec![value]))?;
            Ok(1)
        }
    }
}
