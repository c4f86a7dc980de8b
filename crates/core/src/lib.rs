//! Core types for docpath
//!
//! This crate defines the document model and the pure algorithms over it:
//! - Value: JSON-shaped document values and size/depth limits
//! - DocPath: dot-path addressing, resolution and in-place edits
//! - FlatRecord: flattening nested values to path -> leaf records
//! - Unflatten: rebuilding structure from flat form fields, with type inference
//! - Query: field filters, sub-path refine, sorting
//! - Error: error type shared by every layer
//!
//! Nothing here touches storage or does IO.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod flatten;
pub mod literal;
pub mod path;
pub mod query;
pub mod unflatten;
pub mod value;

pub use error::{Error, Result};
pub use flatten::{
    column_union, flatten, flatten_rows, flatten_with_leaf_key, is_table, FlatRecord,
    DEFAULT_LEAF_KEY,
};
pub use literal::{parse_literal, LiteralError};
pub use path::{
    parse_index, push_at_path, require, resolve, resolve_mut, set_at_path, unset_at_path,
    validate_key, DocPath, PathParseError, Segment,
};
pub use query::{
    field_text, refine, sort_by_field, sort_by_text, FieldFilter, FieldMatcher, MatchMode, Refine,
    SortBy, SortDirection, SortSpec, TextFilter,
};
pub use unflatten::{
    coerce_field, infer_value, unflatten, unflatten_record, unflatten_with_report, Coerced,
    ContainerPolicy, FieldReport, Provenance, Unflattened,
};
pub use value::{
    LimitError, Object, Value, ValueExt, MAX_DOCUMENT_SIZE, MAX_NESTING_DEPTH, MAX_PATH_LENGTH,
};
