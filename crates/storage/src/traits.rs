//! The document store collaborator
//!
//! The engine never holds documents across requests; every read goes to a
//! [`DocumentStore`] and every write is a single targeted store call (or a
//! whole-array replace). Stores are the sole synchronization point.

use crate::document::{Document, DocumentId};
use docpath_core::{DocPath, FieldFilter, Result, SortSpec, Value};

/// Persistence with by-id lookup and partial-path mutation
///
/// All path mutations fail with `DocumentNotFound` for an unknown id.
/// Path semantics follow [`docpath_core::path`]: `PathNotFound` and
/// `TypeMismatch` surface unchanged.
///
/// Failures of the underlying medium surface as `StoreUnavailable`.
pub trait DocumentStore: Send + Sync {
    /// All documents in natural (insertion) order, optionally filtered and sorted
    fn find_all(
        &self,
        filter: Option<&FieldFilter>,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Document>>;

    /// One document, or None if absent
    fn find_by_id(&self, id: &DocumentId) -> Result<Option<Document>>;

    /// Insert a new document; the value must be an Object
    fn insert(&self, value: Value) -> Result<DocumentId>;

    /// Insert many documents, in order
    fn insert_many(&self, values: Vec<Value>) -> Result<Vec<DocumentId>> {
        values.into_iter().map(|v| self.insert(v)).collect()
    }

    /// Remove a document; false if it did not exist
    fn delete_by_id(&self, id: &DocumentId) -> Result<bool>;

    /// Remove every document, returning how many there were
    fn clear(&self) -> Result<usize>;

    /// Swap the whole collection for `values` in one step
    ///
    /// Every value is validated before anything changes; on failure the
    /// existing documents are kept. Returns how many documents were replaced
    /// and the identifiers assigned to the new ones, in order.
    fn replace_all(&self, values: Vec<Value>) -> Result<(usize, Vec<DocumentId>)>;

    /// Number of documents
    fn count(&self) -> Result<usize>;

    /// Set the value at a path, creating missing intermediate objects
    fn set_at_path(&self, id: &DocumentId, path: &DocPath, value: Value) -> Result<()>;

    /// Remove the value at a path; a missing key is a no-op returning None
    fn unset_at_path(&self, id: &DocumentId, path: &DocPath) -> Result<Option<Value>>;

    /// Append to the array at a path, returning its new length
    fn push_at_path(&self, id: &DocumentId, path: &DocPath, value: Value) -> Result<usize>;

    /// Overwrite the array at a path as a whole
    fn replace_at_path(
        &self,
        id: &DocumentId,
        path: &DocPath,
        whole_array: Vec<Value>,
    ) -> Result<()>;
}
