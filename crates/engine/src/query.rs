//! QueryEngine: listing, resolution, detail views and export
//!
//! Top-level filters and sorts are pushed down to the store. Sub-path
//! filtering and sorting run in-process on the resolved value via
//! [`docpath_core::refine`].

use crate::config::EngineConfig;
use crate::view::{DetailView, Export, ExportFormat, FieldType, Table, ViewContent};
use docpath_core::path::require;
use docpath_core::{
    flatten_with_leaf_key, is_table, refine, DocPath, Error, FieldFilter, Refine, Result,
    SortSpec, Value,
};
use docpath_store::{Document, DocumentId, DocumentStore, ID_FIELD};
use std::sync::Arc;
use tracing::debug;

/// Read-only access to stored documents
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn DocumentStore>,
    config: EngineConfig,
}

impl QueryEngine {
    /// Create a QueryEngine over a store
    pub fn new(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Documents in natural order, optionally filtered and sorted by the store
    pub fn list(
        &self,
        filter: Option<&FieldFilter>,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Document>> {
        let docs = self.store.find_all(filter, sort)?;
        debug!(count = docs.len(), filtered = filter.is_some(), "Listed documents");
        Ok(docs)
    }

    /// One document by id
    ///
    /// # Errors
    ///
    /// `DocumentNotFound` if absent.
    pub fn get(&self, id: &DocumentId) -> Result<Document> {
        self.store
            .find_by_id(id)?
            .ok_or_else(|| Error::document_not_found(id))
    }

    /// The `n`-th document in natural order
    ///
    /// # Errors
    ///
    /// `PathNotFound` if `n` is past the end.
    pub fn nth(&self, n: usize) -> Result<Document> {
        self.store
            .find_all(None, None)?
            .into_iter()
            .nth(n)
            .ok_or_else(|| Error::path_not_found(n))
    }

    /// The value at `path` inside a document
    pub fn resolve(&self, id: &DocumentId, path: &DocPath) -> Result<Value> {
        path.validate()?;
        let doc = self.get(id)?;
        require(&doc.value, path).cloned()
    }

    /// The value at `path`, filtered and sorted
    pub fn refine(&self, id: &DocumentId, path: &DocPath, spec: &Refine) -> Result<Value> {
        let value = self.resolve(id, path)?;
        Ok(refine(&value, spec))
    }

    /// Resolve, refine and shape a sub-path for display
    ///
    /// The title is the last path segment with `_` shown as spaces; the root
    /// path is titled with the document id.
    pub fn view(&self, id: &DocumentId, path: &DocPath, spec: &Refine) -> Result<DetailView> {
        let resolved = self.resolve(id, path)?;
        let kind = FieldType::of(&resolved);
        let value = refine(&resolved, spec);

        let content = if is_table(&value) {
            ViewContent::Table(Table::from_value(&value, &self.config.leaf_key)?)
        } else {
            ViewContent::Raw(value)
        };

        let title = match path.last_segment() {
            Some(segment) => segment.as_str().replace('_', " "),
            None => id.to_string(),
        };

        Ok(DetailView {
            title,
            current_path: path.to_string(),
            parent_path: path.parent().map(|p| p.to_string()),
            kind,
            content,
        })
    }

    /// Top-level column names: the key order of the first document
    pub fn columns(&self) -> Result<Vec<String>> {
        let docs = self.store.find_all(None, None)?;
        Ok(docs
            .first()
            .and_then(|d| d.value.as_object())
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default())
    }

    /// Field type per top-level key, in order of first appearance
    ///
    /// Looks at `type_sample_size` documents (all when 0). The first container
    /// seen for a key decides its type; a key never seen holding a container
    /// is `String`.
    pub fn field_types(&self) -> Result<Vec<(String, FieldType)>> {
        let docs = self.store.find_all(None, None)?;
        let sample = match self.config.type_sample_size {
            0 => docs.len(),
            n => n.min(docs.len()),
        };

        let mut types: Vec<(String, FieldType)> = Vec::new();
        for doc in &docs[..sample] {
            let Some(obj) = doc.value.as_object() else {
                continue;
            };
            for (key, value) in obj {
                let seen = FieldType::of(value);
                match types.iter_mut().find(|(k, _)| k == key) {
                    Some((_, ty)) if *ty == FieldType::String => *ty = seen,
                    Some(_) => {}
                    None => types.push((key.clone(), seen)),
                }
            }
        }
        Ok(types)
    }

    /// Export a sub-path of one document
    ///
    /// Structured export is the refined nested value; tabular export flattens
    /// each element (or the value itself, if not an array) into a row.
    pub fn export_path(
        &self,
        id: &DocumentId,
        path: &DocPath,
        spec: &Refine,
        format: ExportFormat,
    ) -> Result<Export> {
        let value = self.refine(id, path, spec)?;
        Ok(match format {
            ExportFormat::Structured => Export::Structured(value),
            ExportFormat::Tabular => {
                Export::Tabular(Table::from_value(&value, &self.config.leaf_key)?)
            }
        })
    }

    /// Export the whole collection
    ///
    /// Each document carries its identifier as `_id`, so tabular exports get an
    /// `_id` column. A document that holds its own `_id` keeps that value.
    pub fn export_collection(
        &self,
        filter: Option<&FieldFilter>,
        sort: Option<&SortSpec>,
        format: ExportFormat,
    ) -> Result<Export> {
        let records: Vec<Value> = self
            .list(filter, sort)?
            .iter()
            .map(Document::to_value_with_id)
            .collect();

        Ok(match format {
            ExportFormat::Structured => Export::Structured(Value::Array(records)),
            ExportFormat::Tabular => {
                let rows = records
                    .iter()
                    .map(|r| flatten_with_leaf_key(r, &self.config.leaf_key))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                debug!(rows = rows.len(), id_column = ID_FIELD, "Tabular export built");
                Export::Tabular(Table::from_rows(rows))
            }
        })
    }
}
