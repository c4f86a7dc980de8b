//! InMemoryStore: document store backed by a locked vector
//!
//! Documents are kept as MessagePack-encoded [`Document`]s in insertion
//! order behind a `parking_lot::RwLock`. Readers always get their own decoded
//! copy; nothing handed out aliases the stored state.
//!
//! # Design Notes
//!
//! - **Natural order**: insertion order, which `find_all` returns when no
//!   sort is requested
//! - **Per-call atomicity**: each mutation decodes, edits, validates and
//!   re-encodes under one write lock. Sequences of calls are not atomic.
//! - **Limits**: every write re-checks size and depth limits

use crate::document::{Document, DocumentId};
use crate::traits::DocumentStore;
use docpath_core::path;
use docpath_core::{
    resolve, sort_by_field, sort_by_text, DocPath, Error, FieldFilter, Result, SortBy,
    SortDirection, SortSpec, Value, ValueExt,
};
use parking_lot::RwLock;
use tracing::debug;

#[derive(Clone)]
struct Slot {
    id: DocumentId,
    bytes: Vec<u8>,
}

/// Thread-safe in-memory document store
#[derive(Default)]
pub struct InMemoryStore {
    slots: RwLock<Vec<Slot>>,
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("documents", &self.slots.read().len())
            .finish()
    }
}

// =============================================================================
// Serialization
// =============================================================================

fn serialize_doc(doc: &Document) -> Result<Vec<u8>> {
    rmp_serde::to_vec(doc).map_err(|e| Error::store_unavailable(format!("encode: {}", e)))
}

fn deserialize_doc(bytes: &[u8]) -> Result<Document> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::store_unavailable(format!("decode: {}", e)))
}

fn encode_slots(docs: &[Document]) -> Result<Vec<Slot>> {
    docs.iter()
        .map(|doc| {
            Ok(Slot {
                id: doc.id,
                bytes: serialize_doc(doc)?,
            })
        })
        .collect()
}

/// Saved copy of a store's contents, restored with [`InMemoryStore::rollback`]
pub(crate) struct Checkpoint(Vec<Slot>);

/// Reject anything that cannot be stored as a document body
pub(crate) fn validate_body(value: &Value) -> Result<()> {
    if !value.is_object() {
        return Err(Error::invalid_input(format!(
            "document root must be an object, found {}",
            value.kind_name()
        )));
    }
    value.validate_limits()?;
    Ok(())
}

/// Apply an optional filter and sort to documents in natural order
pub(crate) fn apply_query(
    docs: Vec<Document>,
    filter: Option<&FieldFilter>,
    sort: Option<&SortSpec>,
) -> Result<Vec<Document>> {
    let mut docs = match filter {
        Some(filter) => {
            let matcher = filter.compile()?;
            docs.into_iter().filter(|d| matcher.matches(&d.value)).collect()
        }
        None => docs,
    };

    if let Some(sort) = sort {
        match &sort.by {
            SortBy::Field(field) => sort_by_field(&mut docs, field, sort.direction, |d| &d.value),
            SortBy::Value => sort_by_text(&mut docs, sort.direction, |d| d.value.to_text()),
            SortBy::Key => {
                if sort.direction == SortDirection::Descending {
                    docs.reverse();
                }
            }
        }
    }
    Ok(docs)
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load pre-existing documents, keeping their identifiers
    pub fn with_documents(docs: Vec<Document>) -> Result<Self> {
        Ok(InMemoryStore {
            slots: RwLock::new(encode_slots(&docs)?),
        })
    }

    /// Decoded copy of every document in natural order
    pub fn snapshot(&self) -> Result<Vec<Document>> {
        let slots = self.slots.read();
        slots.iter().map(|s| deserialize_doc(&s.bytes)).collect()
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.slots.read().clone())
    }

    pub(crate) fn rollback(&self, checkpoint: Checkpoint) {
        *self.slots.write() = checkpoint.0;
    }

    /// Decode, edit, validate and re-encode one document under the write lock
    ///
    /// The stored bytes are untouched if `edit` or validation fails.
    fn modify<T>(
        &self,
        id: &DocumentId,
        op: &str,
        edit: impl FnOnce(&mut Value) -> Result<T>,
    ) -> Result<T> {
        let mut slots = self.slots.write();
        let slot = slots
            .iter_mut()
            .find(|s| s.id == *id)
            .ok_or_else(|| Error::document_not_found(id))?;

        let mut doc = deserialize_doc(&slot.bytes)?;
        let out = edit(&mut doc.value)?;
        validate_body(&doc.value)?;
        doc.touch();
        slot.bytes = serialize_doc(&doc)?;

        debug!(doc_id = %id, op, version = doc.version, "Document updated");
        Ok(out)
    }
}

impl DocumentStore for InMemoryStore {
    fn find_all(
        &self,
        filter: Option<&FieldFilter>,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Document>> {
        apply_query(self.snapshot()?, filter, sort)
    }

    fn find_by_id(&self, id: &DocumentId) -> Result<Option<Document>> {
        let slots = self.slots.read();
        slots
            .iter()
            .find(|s| s.id == *id)
            .map(|s| deserialize_doc(&s.bytes))
            .transpose()
    }

    fn insert(&self, value: Value) -> Result<DocumentId> {
        validate_body(&value)?;
        let doc = Document::new(DocumentId::new(), value);
        let bytes = serialize_doc(&doc)?;
        self.slots.write().push(Slot { id: doc.id, bytes });
        debug!(doc_id = %doc.id, "Document inserted");
        Ok(doc.id)
    }

    fn delete_by_id(&self, id: &DocumentId) -> Result<bool> {
        let mut slots = self.slots.write();
        let before = slots.len();
        slots.retain(|s| s.id != *id);
        let removed = slots.len() != before;
        if removed {
            debug!(doc_id = %id, "Document deleted");
        }
        Ok(removed)
    }

    fn clear(&self) -> Result<usize> {
        let mut slots = self.slots.write();
        let count = slots.len();
        slots.clear();
        Ok(count)
    }

    fn replace_all(&self, values: Vec<Value>) -> Result<(usize, Vec<DocumentId>)> {
        let docs = values
            .into_iter()
            .map(|value| {
                validate_body(&value)?;
                Ok(Document::new(DocumentId::new(), value))
            })
            .collect::<Result<Vec<_>>>()?;
        let fresh = encode_slots(&docs)?;
        let ids: Vec<DocumentId> = docs.iter().map(|d| d.id).collect();

        let replaced = std::mem::replace(&mut *self.slots.write(), fresh).len();
        debug!(replaced, inserted = ids.len(), "Collection replaced");
        Ok((replaced, ids))
    }

    fn count(&self) -> Result<usize> {
        Ok(self.slots.read().len())
    }

    fn set_at_path(&self, id: &DocumentId, path: &DocPath, value: Value) -> Result<()> {
        path.validate()?;
        self.modify(id, "set", |doc| path::set_at_path(doc, path, value))
    }

    fn unset_at_path(&self, id: &DocumentId, path: &DocPath) -> Result<Option<Value>> {
        path.validate()?;
        self.modify(id, "unset", |doc| path::unset_at_path(doc, path))
    }

    fn push_at_path(&self, id: &DocumentId, path: &DocPath, value: Value) -> Result<usize> {
        path.validate()?;
        self.modify(id, "push", |doc| path::push_at_path(doc, path, value))
    }

    fn replace_at_path(
        &self,
        id: &DocumentId,
        path: &DocPath,
        whole_array: Vec<Value>,
    ) -> Result<()> {
        path.validate()?;
        self.modify(id, "replace", |doc| {
            match resolve(doc, path) {
                Some(Value::Array(_)) => {}
                Some(other) => {
                    return Err(Error::TypeMismatch {
                        path: path.to_string(),
                        expected: "array",
                        found: other.kind_name(),
                    })
                }
                None => return Err(Error::path_not_found(path)),
            }
            path::set_at_path(doc, path, Value::Array(whole_array))
        })
    }
}
