//! JsonFileStore: document store persisted as a single JSON file
//!
//! The whole collection lives in memory (an [`InMemoryStore`]) and is written
//! back after every successful mutation as a pretty-printed JSON array, one
//! object per document with its identifier embedded as `_id`.
//!
//! # Durability
//!
//! Writes go to a sibling temp file which is then renamed over the target, so
//! a crash mid-write leaves either the old or the new collection on disk.
//!
//! # Loading
//!
//! A missing or unreadable file loads as an empty collection with a warning.
//! Records that are not objects are skipped. An `_id` that is not one of our
//! identifiers stays in the body and the record's identifier is derived from
//! it, so it is stable across reopens; records without any `_id` get a fresh
//! one.
//!
//! # Failed writes
//!
//! If persisting fails the in-memory change is rolled back, so readers never
//! see state the file does not hold and a retry applies the change once.

use crate::document::{Document, DocumentId, ID_FIELD};
use crate::memory::{apply_query, InMemoryStore};
use crate::traits::DocumentStore;
use docpath_core::{DocPath, Error, FieldFilter, Result, SortSpec, Value};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Document store backed by one JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryStore,
    /// Serializes mutate-then-persist so the file never lags a later write
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading whatever it currently holds
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let docs = load_documents(&path);
        info!(path = %path.display(), documents = docs.len(), "Opened JSON file store");
        Ok(JsonFileStore {
            inner: InMemoryStore::with_documents(docs)?,
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current collection to disk
    pub fn flush(&self) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let records: Vec<Value> = self
            .inner
            .snapshot()?
            .iter()
            .map(Document::to_value_with_id)
            .collect();
        let content = serde_json::to_string_pretty(&records)
            .map_err(|e| Error::store_unavailable(format!("encode collection: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|e| {
            Error::store_unavailable(format!("write '{}': {}", tmp.display(), e))
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            Error::store_unavailable(format!("replace '{}': {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), documents = records.len(), "Persisted collection");
        Ok(())
    }

    /// Run a mutation against the in-memory copy, then persist
    ///
    /// The in-memory copy is restored if the mutation or the write fails.
    fn mutate<T>(&self, op: impl FnOnce(&InMemoryStore) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock();
        let checkpoint = self.inner.checkpoint();
        let out = match op(&self.inner) {
            Ok(out) => out,
            Err(e) => {
                self.inner.rollback(checkpoint);
                return Err(e);
            }
        };
        if let Err(e) = self.persist() {
            self.inner.rollback(checkpoint);
            warn!(path = %self.path.display(), error = %e, "Persist failed, change rolled back");
            return Err(e);
        }
        Ok(out)
    }
}

fn load_documents(path: &Path) -> Vec<Document> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "Data file missing, starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Data file unreadable, starting empty");
            return Vec::new();
        }
    };

    let records: Vec<Value> = match serde_json::from_str(&content) {
        Ok(records) => records,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Data file is not a JSON array, starting empty"
            );
            return Vec::new();
        }
    };

    let mut docs = Vec::with_capacity(records.len());
    for (idx, record) in records.into_iter().enumerate() {
        if !record.is_object() {
            warn!(index = idx, "Skipping non-object record");
            continue;
        }
        let (id, body) = Document::split_id(record);
        let id = match id {
            Some(id) => {
                if docs.iter().any(|d: &Document| d.id == id) {
                    warn!(index = idx, doc_id = %id, "Skipping record with duplicate _id");
                    continue;
                }
                id
            }
            None => match body.get(ID_FIELD) {
                Some(foreign) => {
                    let derived = DocumentId::derive(foreign);
                    if docs.iter().any(|d: &Document| d.id == derived) {
                        warn!(index = idx, "Duplicate foreign _id, assigning a fresh identifier");
                        DocumentId::new()
                    } else {
                        derived
                    }
                }
                None => DocumentId::new(),
            },
        };
        docs.push(Document::new(id, body));
    }
    docs
}

impl DocumentStore for JsonFileStore {
    fn find_all(
        &self,
        filter: Option<&FieldFilter>,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Document>> {
        apply_query(self.inner.snapshot()?, filter, sort)
    }

    fn find_by_id(&self, id: &DocumentId) -> Result<Option<Document>> {
        self.inner.find_by_id(id)
    }

    fn insert(&self, value: Value) -> Result<DocumentId> {
        self.mutate(|s| s.insert(value))
    }

    fn insert_many(&self, values: Vec<Value>) -> Result<Vec<DocumentId>> {
        self.mutate(|s| s.insert_many(values))
    }

    fn delete_by_id(&self, id: &DocumentId) -> Result<bool> {
        self.mutate(|s| s.delete_by_id(id))
    }

    fn clear(&self) -> Result<usize> {
        self.mutate(|s| s.clear())
    }

    fn replace_all(&self, values: Vec<Value>) -> Result<(usize, Vec<DocumentId>)> {
        self.mutate(|s| s.replace_all(values))
    }

    fn count(&self) -> Result<usize> {
        self.inner.count()
    }

    fn set_at_path(&self, id: &DocumentId, path: &DocPath, value: Value) -> Result<()> {
        self.mutate(|s| s.set_at_path(id, path, value))
    }

    fn unset_at_path(&self, id: &DocumentId, path: &DocPath) -> Result<Option<Value>> {
        self.mutate(|s| s.unset_at_path(id, path))
    }

    fn push_at_path(&self, id: &DocumentId, path: &DocPath, value: Value) -> Result<usize> {
        self.mutate(|s| s.push_at_path(id, path, value))
    }

    fn replace_at_path(
        &self,
        id: &DocumentId,
        path: &DocPath,
        whole_array: Vec<Value>,
    ) -> Result<()> {
        self.mutate(|s| s.replace_at_path(id, path, whole_array))
    }
}
