//! Shapes handed to the presentation layer
//!
//! Nothing here is persisted. Field types, tables and exports are recomputed
//! from the store on every request.

use docpath_core::{column_union, flatten_rows, FlatRecord, LimitError, Value};
use serde::Serialize;

/// UI hint for a top-level field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Any leaf
    String,
    /// An object
    Dict,
    /// An array
    List,
}

impl FieldType {
    /// Field type of a single value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => FieldType::Dict,
            Value::Array(_) => FieldType::List,
            _ => FieldType::String,
        }
    }
}

/// Flattened rows with the sorted union of their columns
///
/// A row missing a column simply has no entry for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// Sorted column names
    pub columns: Vec<String>,
    /// One flat record per element
    pub rows: Vec<FlatRecord>,
}

impl Table {
    /// Flatten every element of `value` into a row
    pub fn from_value(value: &Value, leaf_key: &str) -> Result<Self, LimitError> {
        Ok(Self::from_rows(flatten_rows(value, leaf_key)?))
    }

    /// Build from already flattened rows
    pub fn from_rows(rows: Vec<FlatRecord>) -> Self {
        Table {
            columns: column_union(&rows),
            rows,
        }
    }
}

/// How a resolved value should be shown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewContent {
    /// A non-empty array whose first element is an object
    Table(Table),
    /// Anything else, as is
    Raw(Value),
}

/// A resolved sub-path ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    /// Last path segment with `_` shown as spaces
    pub title: String,
    /// The path that was resolved
    pub current_path: String,
    /// Where "up" leads; None at the first level
    pub parent_path: Option<String>,
    /// Field type of the resolved value before display shaping
    pub kind: FieldType,
    /// The filtered and sorted value, shaped for display
    pub content: ViewContent,
}

/// Requested export encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// The nested value itself
    #[default]
    Structured,
    /// Flattened rows with unioned columns
    Tabular,
}

/// Data for an external formatter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Export {
    /// The raw nested value
    Structured(Value),
    /// Flattened rows
    Tabular(Table),
}
