//! Value helpers and document limits
//!
//! The engine manipulates a single schema-less shape: [`Value`], the recursive
//! Null/Bool/Number/String/Array/Object sum type from `serde_json`. Objects keep
//! their insertion order (the workspace enables `preserve_order`).
//!
//! # Document Size Limits
//!
//! | Limit | Value | Constant |
//! |-------|-------|----------|
//! | Max document size | 16 MB | [`MAX_DOCUMENT_SIZE`] |
//! | Max nesting depth | 100 levels | [`MAX_NESTING_DEPTH`] |
//! | Max path length | 256 segments | [`MAX_PATH_LENGTH`] |

use serde_json::Map;
use thiserror::Error;

pub use serde_json::Value;

/// Ordered String -> Value mapping used for objects
pub type Object = Map<String, Value>;

// =============================================================================
// Document Size Limits
// =============================================================================

/// Maximum document size in bytes (16 MB)
///
/// Checked when a whole document or a whole array is written.
pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Maximum nesting depth of a value (100 levels)
///
/// Bounds every traversal: flattening, re-nesting, literal parsing.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Maximum path length in segments (256 segments)
pub const MAX_PATH_LENGTH: usize = 256;

/// Error type for document limit violations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LimitError {
    /// Document exceeds maximum size
    #[error("document size {size} exceeds maximum {max} bytes")]
    DocumentTooLarge {
        /// Actual size in bytes
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Value nesting exceeds maximum depth
    #[error("nesting depth {depth} exceeds maximum {max}")]
    NestingTooDeep {
        /// Depth reached
        depth: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Path exceeds maximum number of segments
    #[error("path length {length} exceeds maximum {max} segments")]
    PathTooLong {
        /// Actual length
        length: usize,
        /// Maximum allowed
        max: usize,
    },
}

// =============================================================================
// ValueExt
// =============================================================================

/// Engine-level helpers on [`Value`]
pub trait ValueExt {
    /// Short kind name used in error messages
    fn kind_name(&self) -> &'static str;

    /// True for Null, Bool, Number and String
    fn is_leaf(&self) -> bool;

    /// Stringified form used for filtering, sorting and display
    ///
    /// Strings render without quotes; everything else renders as compact JSON.
    fn to_text(&self) -> String;

    /// Maximum nesting depth; 0 for leaves
    fn nesting_depth(&self) -> usize;

    /// Approximate serialized size in bytes
    fn size_bytes(&self) -> usize;

    /// Check size and depth limits
    fn validate_limits(&self) -> Result<(), LimitError>;
}

impl ValueExt for Value {
    fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    fn is_leaf(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Object(_))
    }

    fn to_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn nesting_depth(&self) -> usize {
        // Explicit stack: values built in memory are not bounded by the
        // parser's recursion limit.
        let mut max = 0;
        let mut stack: Vec<(&Value, usize)> = vec![(self, 0)];
        while let Some((value, depth)) = stack.pop() {
            match value {
                Value::Array(arr) => {
                    max = max.max(depth + 1);
                    stack.extend(arr.iter().map(|v| (v, depth + 1)));
                }
                Value::Object(obj) => {
                    max = max.max(depth + 1);
                    stack.extend(obj.values().map(|v| (v, depth + 1)));
                }
                _ => {}
            }
        }
        max
    }

    fn size_bytes(&self) -> usize {
        self.to_string().len()
    }

    fn validate_limits(&self) -> Result<(), LimitError> {
        let depth = self.nesting_depth();
        if depth > MAX_NESTING_DEPTH {
            return Err(LimitError::NestingTooDeep {
                depth,
                max: MAX_NESTING_DEPTH,
            });
        }
        let size = self.size_bytes();
        if size > MAX_DOCUMENT_SIZE {
            return Err(LimitError::DocumentTooLarge {
                size,
                max: MAX_DOCUMENT_SIZE,
            });
        }
        Ok(())
    }
}
