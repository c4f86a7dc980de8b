//! Error types for the document engine
//!
//! Structural failures (a path that does not resolve, a container of the wrong
//! kind) are always surfaced to the caller. Type-inference ambiguity is never
//! an error: it is recovered locally by keeping the submitted text as a string
//! (see [`crate::unflatten::Provenance`]).
//!
//! | Category | Variants | Caller outcome |
//! |----------|----------|----------------|
//! | Not Found | `PathNotFound`, `DocumentNotFound` | "not found" |
//! | Type | `TypeMismatch` | operation aborted |
//! | Validation | `IdentifierInvalid`, `InvalidPath`, `InvalidInput`, `Limit` | bad request |
//! | Access | `Forbidden` | rejected before any store call |
//! | System | `StoreUnavailable` | retryable, no automatic retry |
//! | System | `Io` | not retryable (local file such as the config) |

use crate::path::PathParseError;
use crate::value::LimitError;
use thiserror::Error;

/// Result type alias for document engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the document engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A path does not resolve against the current document
    #[error("path not found: '{path}'")]
    PathNotFound {
        /// The dot-path that failed to resolve
        path: String,
    },

    /// No document with the given identifier exists
    #[error("document not found: {id}")]
    DocumentNotFound {
        /// The identifier that was looked up
        id: String,
    },

    /// The resolved value has the wrong container kind for the operation
    #[error("type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Path of the offending value
        path: String,
        /// Kind the operation requires
        expected: &'static str,
        /// Kind actually found
        found: &'static str,
    },

    /// Malformed document identifier, rejected before any store call
    #[error("invalid document identifier: {0}")]
    IdentifierInvalid(String),

    /// Path string could not be parsed
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathParseError),

    /// Caller supplied unusable input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Document or path exceeded a size limit
    #[error("limit exceeded: {0}")]
    Limit(#[from] LimitError),

    /// The request context lacks the role required for the operation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Transport or persistence failure in the document store
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Local file failure outside the document store
    #[error("I/O error: {reason}")]
    Io {
        /// What failed and why
        reason: String,
    },
}

impl Error {
    /// Build a `PathNotFound` error for a displayable path
    pub fn path_not_found(path: impl ToString) -> Self {
        Error::PathNotFound {
            path: path.to_string(),
        }
    }

    /// Build a `DocumentNotFound` error for a displayable identifier
    pub fn document_not_found(id: impl ToString) -> Self {
        Error::DocumentNotFound { id: id.to_string() }
    }

    /// Build an `InvalidInput` error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput(reason.into())
    }

    /// Build a `StoreUnavailable` error
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Error::StoreUnavailable(reason.into())
    }

    /// Build an `Io` error
    pub fn io(reason: impl Into<String>) -> Self {
        Error::Io {
            reason: reason.into(),
        }
    }

    /// True if the caller may retry the same operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_))
    }

    /// True for the "not found" family
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::PathNotFound { .. } | Error::DocumentNotFound { .. }
        )
    }
}
