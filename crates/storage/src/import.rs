//! Collection seeding from a JSON array file

use crate::document::{Document, DocumentId};
use crate::memory::validate_body;
use crate::traits::DocumentStore;
use docpath_core::{Error, Result, Value, ValueExt};
use std::path::Path;
use tracing::info;

/// Replace the store's contents with the records of a JSON array file
///
/// Returns the number of documents inserted.
///
/// # Errors
///
/// - `InvalidInput` if the file cannot be read, is not a JSON array, or any
///   record is not an object.
/// - `Limit` if any record exceeds the size or depth limits.
/// - Any store error from the replace.
///
/// The store is left untouched on every error.
pub fn import_documents(store: &dyn DocumentStore, source: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(source).map_err(|e| {
        Error::invalid_input(format!("cannot read '{}': {}", source.display(), e))
    })?;
    let parsed: Value = serde_json::from_str(&content).map_err(|e| {
        Error::invalid_input(format!("cannot parse '{}': {}", source.display(), e))
    })?;
    let Value::Array(records) = parsed else {
        return Err(Error::invalid_input(format!(
            "'{}' must contain a JSON array, found {}",
            source.display(),
            parsed.kind_name()
        )));
    };
    import_records(store, records)
}

/// Replace the store's contents with `records`
///
/// Every record must be an object within the document limits. An embedded
/// `_id` that is one of our identifiers is dropped and a new one assigned;
/// any other `_id` is kept as part of the record. All records are checked
/// before the collection is swapped.
pub fn import_records(store: &dyn DocumentStore, records: Vec<Value>) -> Result<usize> {
    for (idx, record) in records.iter().enumerate() {
        if !record.is_object() {
            return Err(Error::invalid_input(format!(
                "record {} is {}, expected object",
                idx,
                record.kind_name()
            )));
        }
        validate_body(record)?;
    }

    let bodies: Vec<Value> = records
        .into_iter()
        .map(|r| Document::split_id(r).1)
        .collect();

    let (replaced, ids) = store.replace_all(bodies)?;
    info!(replaced, imported = ids.len(), "Imported documents");
    Ok(ids.len())
}
