//! Test utilities for the document engine suite
//!
//! Provides helpers for creating engines, seeding documents and building paths.

#![allow(dead_code)]

pub use docpath::{
    DocPath, DocumentEngine, DocumentId, Error, RequestContext, Value,
};
pub use serde_json::json;

// =============================================================================
// Engine Creation
// =============================================================================

/// Create an engine over an in-memory store
pub fn create_engine() -> DocumentEngine {
    DocumentEngine::ephemeral()
}

/// Create an engine holding one document
pub fn setup_doc(value: Value) -> (DocumentEngine, DocumentId) {
    let engine = create_engine();
    let id = engine
        .mutation()
        .insert_document(&admin(), value)
        .expect("Failed to insert test document");
    (engine, id)
}

/// A typical nested patient record
pub fn patient_record() -> Value {
    json!({
        "Name": "Amy Pond",
        "Patient_ID": 42,
        "Medical_Record": {
            "Blood_Type": "O-",
            "Diagnostics": [
                {"code": "K21", "date": "2024-03-01", "detail": {"severity": "mild"}},
                {"code": "E11", "date": "2023-11-12"},
                {"code": "J45", "date": "2024-01-20", "notes": "seasonal"}
            ],
            "Allergies": ["Pollen", "penicillin", "Latex"]
        }
    })
}

// =============================================================================
// Path Helpers
// =============================================================================

/// Parse a dot-path
pub fn path(s: &str) -> DocPath {
    s.parse().expect("Invalid test path")
}

/// Admin request context
pub fn admin() -> RequestContext {
    RequestContext::admin()
}

/// Current value at `p` in document `id`
pub fn value_at(engine: &DocumentEngine, id: &DocumentId, p: &str) -> Value {
    engine
        .query()
        .resolve(id, &path(p))
        .expect("Path should resolve")
}

/// Current array at `p` in document `id`
pub fn array_at(engine: &DocumentEngine, id: &DocumentId, p: &str) -> Vec<Value> {
    match value_at(engine, id, p) {
        Value::Array(items) => items,
        other => panic!("expected array at '{}', found {}", p, other),
    }
}
