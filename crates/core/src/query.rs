//! Filtering and sorting
//!
//! Two levels share the same types:
//!
//! - **Top level**: a [`FieldFilter`] on one named field of each document,
//!   compiled to a case-insensitive regex and pushed down to the store.
//! - **Sub-path**: [`refine`] applies a case-insensitive substring filter and a
//!   sort in-process to whatever value a path resolved to.
//!
//! All comparisons use the stringified form ([`ValueExt::to_text`]), so numbers
//! sort as text: `"10" < "9"`.

use crate::error::{Error, Result};
use crate::path::{resolve, DocPath};
use crate::value::{Object, Value, ValueExt};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};

// =============================================================================
// Sort
// =============================================================================

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// What a sort compares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Object entries by key; array elements keep index order
    Key,
    /// Stringified element or entry value
    Value,
    /// Stringified value of a named field (dot-path) of each element
    Field(String),
}

/// A sort request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Sort key
    pub by: SortBy,
    /// Direction
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    /// Ascending sort on a named field
    pub fn field(name: impl Into<String>) -> Self {
        SortSpec {
            by: SortBy::Field(name.into()),
            direction: SortDirection::Ascending,
        }
    }

    /// Ascending sort with an explicit key
    pub fn by(by: SortBy) -> Self {
        SortSpec {
            by,
            direction: SortDirection::Ascending,
        }
    }

    /// Flip to descending (builder pattern)
    pub fn descending(mut self) -> Self {
        self.direction = SortDirection::Descending;
        self
    }
}

/// Stringified value of `field` inside `value`; empty if absent
///
/// `field` is a dot-path, so nested fields work too. A field name that is not
/// a valid path matches nothing.
pub fn field_text(value: &Value, field: &str) -> String {
    field
        .parse::<DocPath>()
        .ok()
        .and_then(|path| resolve(value, &path).map(ValueExt::to_text))
        .unwrap_or_default()
}

/// Stable sort of arbitrary items by the stringified `field` of their value
///
/// Used by stores to order documents.
pub fn sort_by_field<T>(
    items: &mut [T],
    field: &str,
    direction: SortDirection,
    value_of: impl Fn(&T) -> &Value,
) {
    sort_by_text(items, direction, |item| field_text(value_of(item), field));
}

/// Stable sort by a text key; ties keep their relative order in both directions
pub fn sort_by_text<T>(items: &mut [T], direction: SortDirection, key: impl Fn(&T) -> String) {
    match direction {
        SortDirection::Ascending => items.sort_by_cached_key(key),
        SortDirection::Descending => items.sort_by_cached_key(|item| Reverse(key(item))),
    }
}

// =============================================================================
// Top-level filter
// =============================================================================

/// How a [`FieldFilter`] pattern is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Literal substring
    #[default]
    Substring,
    /// Regular expression
    Regex,
}

/// Case-insensitive match on one named field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    /// Field name (dot-path) to match on
    pub field: String,
    /// Pattern text
    pub pattern: String,
    /// Substring or regex
    #[serde(default)]
    pub mode: MatchMode,
}

impl FieldFilter {
    /// Substring filter
    pub fn contains(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        FieldFilter {
            field: field.into(),
            pattern: pattern.into(),
            mode: MatchMode::Substring,
        }
    }

    /// Regex filter
    pub fn regex(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        FieldFilter {
            field: field.into(),
            pattern: pattern.into(),
            mode: MatchMode::Regex,
        }
    }

    /// Compile into a reusable matcher
    ///
    /// # Errors
    ///
    /// `InvalidInput` if a regex pattern does not compile.
    pub fn compile(&self) -> Result<FieldMatcher> {
        let source = match self.mode {
            MatchMode::Substring => regex::escape(&self.pattern),
            MatchMode::Regex => self.pattern.clone(),
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::invalid_input(format!("bad filter pattern: {}", e)))?;
        Ok(FieldMatcher {
            field: self.field.clone(),
            regex,
        })
    }
}

/// A compiled [`FieldFilter`]
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    field: String,
    regex: Regex,
}

impl FieldMatcher {
    /// True if the named field exists and its text matches
    pub fn matches(&self, value: &Value) -> bool {
        let Ok(path) = self.field.parse::<DocPath>() else {
            return false;
        };
        resolve(value, &path)
            .map(|v| self.regex.is_match(&v.to_text()))
            .unwrap_or(false)
    }
}

// =============================================================================
// Sub-path refine
// =============================================================================

/// Case-insensitive substring filter for a resolved value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextFilter {
    /// Substring to look for
    pub needle: String,
    /// Restrict object elements to this field
    #[serde(default)]
    pub field: Option<String>,
}

impl TextFilter {
    /// Match anywhere in each element
    pub fn anywhere(needle: impl Into<String>) -> Self {
        TextFilter {
            needle: needle.into(),
            field: None,
        }
    }

    /// Match within one field of each object element
    pub fn in_field(field: impl Into<String>, needle: impl Into<String>) -> Self {
        TextFilter {
            needle: needle.into(),
            field: Some(field.into()),
        }
    }
}

/// Filter and sort applied to a resolved value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Refine {
    /// Optional filter
    #[serde(default)]
    pub filter: Option<TextFilter>,
    /// Optional sort
    #[serde(default)]
    pub sort: Option<SortSpec>,
}

impl Refine {
    /// No filtering, no sorting
    pub fn none() -> Self {
        Refine::default()
    }

    /// True if applying this would change nothing
    pub fn is_noop(&self) -> bool {
        self.filter.as_ref().map_or(true, |f| f.needle.is_empty()) && self.sort.is_none()
    }
}

/// Text an element is filtered and sorted by
fn element_text(element: &Value, field: Option<&str>) -> String {
    match (element, field) {
        (Value::Object(_), Some(field)) => field_text(element, field),
        _ => element.to_text(),
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Filter and sort a resolved value in-process
///
/// - Array: elements are kept when the needle occurs in the named field of
///   object elements, or anywhere in the stringified element otherwise.
/// - Object: entries are kept when the needle occurs in the key or the
///   stringified value.
/// - Leaves are returned unchanged.
///
/// Sorting is stable; ties keep their original relative order.
pub fn refine(value: &Value, spec: &Refine) -> Value {
    match value {
        Value::Array(arr) => Value::Array(refine_array(arr, spec)),
        Value::Object(obj) => Value::Object(refine_object(obj, spec)),
        leaf => leaf.clone(),
    }
}

fn refine_array(arr: &[Value], spec: &Refine) -> Vec<Value> {
    let mut out: Vec<Value> = match spec.filter.as_ref().filter(|f| !f.needle.is_empty()) {
        Some(filter) => {
            let needle = filter.needle.to_lowercase();
            arr.iter()
                .filter(|el| contains_ci(&element_text(el, filter.field.as_deref()), &needle))
                .cloned()
                .collect()
        }
        None => arr.to_vec(),
    };

    if let Some(sort) = &spec.sort {
        match &sort.by {
            SortBy::Key => {
                if sort.direction == SortDirection::Descending {
                    out.reverse();
                }
            }
            SortBy::Value => sort_values(&mut out, None, sort.direction),
            SortBy::Field(field) => sort_values(&mut out, Some(field), sort.direction),
        }
    }
    out
}

fn sort_values(values: &mut [Value], field: Option<&str>, direction: SortDirection) {
    let mut keyed: Vec<(String, Value)> = values
        .iter()
        .map(|v| (element_text(v, field), v.clone()))
        .collect();
    keyed.sort_by(|a, b| direction.apply(a.0.cmp(&b.0)));
    for (slot, (_, v)) in values.iter_mut().zip(keyed) {
        *slot = v;
    }
}

fn refine_object(obj: &Object, spec: &Refine) -> Object {
    let filter = spec.filter.as_ref().filter(|f| !f.needle.is_empty());
    let mut entries: Vec<(&String, &Value)> = match filter {
        Some(filter) => {
            let needle = filter.needle.to_lowercase();
            obj.iter()
                .filter(|(k, v)| contains_ci(k, &needle) || contains_ci(&v.to_text(), &needle))
                .collect()
        }
        None => obj.iter().collect(),
    };

    if let Some(sort) = &spec.sort {
        match &sort.by {
            SortBy::Key => entries.sort_by(|a, b| sort.direction.apply(a.0.cmp(b.0))),
            SortBy::Value => sort_by_text(&mut entries, sort.direction, |(_, v)| v.to_text()),
            SortBy::Field(field) => {
                sort_by_text(&mut entries, sort.direction, |(_, v)| element_text(v, Some(field)))
            }
        }
    }

    entries
        .into_iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
