//! MutationEngine: structural edits addressed by document id and path
//!
//! ## Design: STATELESS FACADE
//!
//! MutationEngine holds only a store handle and its configuration. No caches,
//! no locks. Every operation reads the current document from the store,
//! checks the target, and issues one store call.
//!
//! ## Store Granularity
//!
//! | Operation | Store call |
//! |-----------|------------|
//! | `add_key` | `set_at_path` on `path.key` |
//! | `append_item` | `push_at_path` |
//! | `add_column` | `replace_at_path` with the whole array |
//! | `delete_at` (key) | `unset_at_path` on `path.key` |
//! | `delete_at` (index) | `replace_at_path` with the whole array |
//!
//! The two whole-array operations are read-modify-write. A concurrent writer
//! to the same array between the read and the replace loses its update.
//!
//! ## Errors
//!
//! Every operation fails with `PathNotFound` if `path` does not resolve, and
//! with `TypeMismatch` if the resolved value has the wrong container kind.
//! Mutations require an admin [`RequestContext`].

use crate::config::{AddColumnMode, EngineConfig};
use crate::context::RequestContext;
use docpath_core::path::{parse_index, require, validate_key};
use docpath_core::{infer_value, unflatten, DocPath, Error, Object, Result, Value, ValueExt};
use docpath_store::{import_documents, DocumentId, DocumentStore};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Form field naming the key to add to an object
pub const NEW_KEY_NAME_FIELD: &str = "new_key_name";
/// Form field carrying the new key's value
pub const NEW_KEY_VALUE_FIELD: &str = "new_key_value";
/// Form field choosing between a scalar and an empty object
pub const VAL_TYPE_FIELD: &str = "val_type";
/// `val_type` value requesting an empty object
pub const VAL_TYPE_OBJECT: &str = "json_object";
/// Form field carrying a single scalar item for an array
pub const NEW_ITEM_FIELD: &str = "new_item";

/// Value for [`MutationEngine::add_key`]
///
/// The caller states container-vs-scalar intent; it is never inferred.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyValue {
    /// A leaf value
    Scalar(Value),
    /// A fresh empty object
    EmptyObject,
}

impl KeyValue {
    fn into_value(self) -> Result<Value> {
        match self {
            KeyValue::Scalar(v) if v.is_leaf() => Ok(v),
            KeyValue::Scalar(v) => Err(Error::invalid_input(format!(
                "scalar key value expected, found {}",
                v.kind_name()
            ))),
            KeyValue::EmptyObject => Ok(Value::Object(Object::new())),
        }
    }
}

/// Result of [`MutationEngine::delete_at`]
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// Something was removed
    Removed(Value),
    /// Nothing matched; the document is unchanged
    Absent,
}

/// Result of [`MutationEngine::add_any`]
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// An item was appended; the array now has this length
    Appended(usize),
    /// A key was added to an object
    KeyAdded(String),
    /// The form named nothing to add
    Nothing,
}

/// Structural edits on stored documents
#[derive(Clone)]
pub struct MutationEngine {
    store: Arc<dyn DocumentStore>,
    config: EngineConfig,
}

impl MutationEngine {
    /// Create a MutationEngine over a store
    pub fn new(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// The configuration in use
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Current value at `path`, cloned out of a fresh read
    fn target(&self, id: &DocumentId, path: &DocPath) -> Result<Value> {
        path.validate()?;
        let doc = self
            .store
            .find_by_id(id)?
            .ok_or_else(|| Error::document_not_found(id))?;
        require(&doc.value, path).cloned()
    }

    fn mismatch(path: &DocPath, expected: &'static str, found: &Value) -> Error {
        Error::TypeMismatch {
            path: path.to_string(),
            expected,
            found: found.kind_name(),
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Set `path.key` on the object at `path`
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `key` is empty or contains `.`
    /// - `TypeMismatch` if the target is not an object; arrays take
    ///   [`append_item`](Self::append_item) instead
    pub fn add_key(
        &self,
        ctx: &RequestContext,
        id: &DocumentId,
        path: &DocPath,
        key: &str,
        value: KeyValue,
    ) -> Result<()> {
        ctx.require_admin("add_key")?;
        validate_key(key).map_err(|e| Error::invalid_input(e.to_string()))?;
        let value = value.into_value()?;

        match self.target(id, path)? {
            Value::Object(_) => {}
            other => return Err(Self::mismatch(path, "object", &other)),
        }

        let key_path = path.clone().child(key);
        self.store.set_at_path(id, &key_path, value)?;
        info!(doc_id = %id, path = %key_path, actor = ctx.actor(), "Key added");
        Ok(())
    }

    /// Append `item` to the array at `path`
    ///
    /// Returns the new length.
    pub fn append_item(
        &self,
        ctx: &RequestContext,
        id: &DocumentId,
        path: &DocPath,
        item: Value,
    ) -> Result<usize> {
        ctx.require_admin("append_item")?;
        match self.target(id, path)? {
            Value::Array(_) => {}
            other => return Err(Self::mismatch(path, "array", &other)),
        }

        let len = self.store.push_at_path(id, path, item)?;
        info!(doc_id = %id, path = %path, len, actor = ctx.actor(), "Item appended");
        Ok(len)
    }

    /// Give every object element of the array at `path` a `column`
    ///
    /// With [`AddColumnMode::Overwrite`] existing values are replaced; with
    /// [`AddColumnMode::Preserve`] only elements lacking the column change.
    /// Non-object elements are left alone. Returns how many elements changed.
    pub fn add_column(
        &self,
        ctx: &RequestContext,
        id: &DocumentId,
        path: &DocPath,
        column: &str,
        default: Value,
    ) -> Result<usize> {
        ctx.require_admin("add_column")?;
        validate_key(column).map_err(|e| Error::invalid_input(e.to_string()))?;
        let mode = self.config.add_column_mode()?;

        let mut items = match self.target(id, path)? {
            Value::Array(items) => items,
            other => return Err(Self::mismatch(path, "array", &other)),
        };

        let mut changed = 0;
        for item in items.iter_mut() {
            let Value::Object(obj) = item else {
                continue;
            };
            if mode == AddColumnMode::Preserve && obj.contains_key(column) {
                continue;
            }
            obj.insert(column.to_string(), default.clone());
            changed += 1;
        }

        self.store.replace_at_path(id, path, items)?;
        info!(doc_id = %id, path = %path, column, changed, actor = ctx.actor(), "Column added");
        Ok(changed)
    }

    /// Remove an element or key below `path`
    ///
    /// If `key_or_index` is a non-negative integer within the bounds of the
    /// array at `path`, that element is removed and later elements shift
    /// down. Otherwise it is treated as an object key and removed if present.
    /// An array has no keys, so an out-of-range token on an array is a no-op.
    pub fn delete_at(
        &self,
        ctx: &RequestContext,
        id: &DocumentId,
        path: &DocPath,
        key_or_index: &str,
    ) -> Result<DeleteOutcome> {
        ctx.require_admin("delete_at")?;
        if key_or_index.is_empty() {
            return Err(Error::invalid_input("nothing to delete: empty key"));
        }

        let outcome = match self.target(id, path)? {
            Value::Array(mut items) => match parse_index(key_or_index) {
                Some(idx) if idx < items.len() => {
                    let removed = items.remove(idx);
                    self.store.replace_at_path(id, path, items)?;
                    DeleteOutcome::Removed(removed)
                }
                _ => DeleteOutcome::Absent,
            },
            Value::Object(_) => {
                validate_key(key_or_index).map_err(|e| Error::invalid_input(e.to_string()))?;
                match self.store.unset_at_path(id, &path.clone().child(key_or_index))? {
                    Some(removed) => DeleteOutcome::Removed(removed),
                    None => DeleteOutcome::Absent,
                }
            }
            other => return Err(Self::mismatch(path, "container", &other)),
        };

        info!(
            doc_id = %id,
            path = %path,
            target = key_or_index,
            removed = matches!(outcome, DeleteOutcome::Removed(_)),
            actor = ctx.actor(),
            "Delete applied"
        );
        Ok(outcome)
    }

    /// Single entry point for "add" forms, dispatched on the target's kind
    ///
    /// - Array: a lone `new_item` field appends one scalar (bracketed text is
    ///   parsed); otherwise every field is unflattened into one composite row.
    /// - Object: adds `new_key_name`, set to an empty object when `val_type`
    ///   is `json_object` and to the `new_key_value` text otherwise. A form
    ///   without a `new_key_value` field stores null.
    ///
    /// A form that names nothing to add is not an error.
    pub fn add_any<K, V>(
        &self,
        ctx: &RequestContext,
        id: &DocumentId,
        path: &DocPath,
        fields: &[(K, V)],
    ) -> Result<AddOutcome>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        ctx.require_admin("add_any")?;
        let raw = |name: &str| {
            fields
                .iter()
                .find(|(k, _)| k.as_ref() == name)
                .map(|(_, v)| v.as_ref())
        };
        let field = |name: &str| raw(name).filter(|v| !v.is_empty());

        match self.target(id, path)? {
            Value::Array(_) => {
                let item = match (field(NEW_ITEM_FIELD), fields.len()) {
                    (Some(raw), 1) => infer_value(raw).value,
                    _ => {
                        let row = unflatten(fields.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))?;
                        if row.as_object().map_or(true, |o| o.is_empty()) {
                            return Ok(AddOutcome::Nothing);
                        }
                        row
                    }
                };
                self.append_item(ctx, id, path, item).map(AddOutcome::Appended)
            }
            Value::Object(_) => {
                let Some(key) = field(NEW_KEY_NAME_FIELD) else {
                    return Ok(AddOutcome::Nothing);
                };
                let value = if field(VAL_TYPE_FIELD) == Some(VAL_TYPE_OBJECT) {
                    KeyValue::EmptyObject
                } else {
                    KeyValue::Scalar(
                        raw(NEW_KEY_VALUE_FIELD)
                            .map_or(Value::Null, |v| Value::String(v.to_string())),
                    )
                };
                self.add_key(ctx, id, path, key, value)?;
                Ok(AddOutcome::KeyAdded(key.to_string()))
            }
            other => Err(Self::mismatch(path, "container", &other)),
        }
    }

    // ========================================================================
    // Document lifecycle
    // ========================================================================

    /// Store a new document; the value must be an object
    pub fn insert_document(&self, ctx: &RequestContext, value: Value) -> Result<DocumentId> {
        ctx.require_admin("insert_document")?;
        let id = self.store.insert(value)?;
        info!(doc_id = %id, actor = ctx.actor(), "Document created");
        Ok(id)
    }

    /// Remove a document
    ///
    /// # Errors
    ///
    /// `DocumentNotFound` if no such document exists.
    pub fn delete_document(&self, ctx: &RequestContext, id: &DocumentId) -> Result<()> {
        ctx.require_admin("delete_document")?;
        if !self.store.delete_by_id(id)? {
            return Err(Error::document_not_found(id));
        }
        info!(doc_id = %id, actor = ctx.actor(), "Document deleted");
        Ok(())
    }

    /// Replace the whole collection with the records of a JSON array file
    ///
    /// Returns the number of documents imported. The collection is unchanged
    /// on any error.
    pub fn import(&self, ctx: &RequestContext, source: &Path) -> Result<usize> {
        ctx.require_admin("import")?;
        let imported = import_documents(self.store.as_ref(), source)?;
        info!(source = %source.display(), imported, actor = ctx.actor(), "Collection imported");
        Ok(imported)
    }
}
