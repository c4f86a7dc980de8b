//! docpath - path-addressable document engine
//!
//! Stores schema-less nested documents and lets callers read and edit them by
//! dot-path (`Medical_Record.Diagnostics.0.code`), flatten them into tables,
//! and rebuild structure from flat form submissions.
//!
//! # Quick Start
//!
//! ```
//! use docpath::{DocumentEngine, KeyValue, RequestContext};
//! use serde_json::json;
//!
//! let engine = DocumentEngine::ephemeral();
//! let ctx = RequestContext::admin();
//!
//! let id = engine
//!     .mutation()
//!     .insert_document(&ctx, json!({"profile": {}}))
//!     .unwrap();
//! let profile = "profile".parse().unwrap();
//! engine
//!     .mutation()
//!     .add_key(&ctx, &id, &profile, "blood_type", KeyValue::Scalar(json!("A+")))
//!     .unwrap();
//!
//! let value = engine.query().resolve(&id, &"profile.blood_type".parse().unwrap()).unwrap();
//! assert_eq!(value, json!("A+"));
//! ```
//!
//! # Architecture
//!
//! - `docpath-core`: values, paths, flatten/unflatten, refine, errors
//! - `docpath-store`: the store trait and its in-memory and JSON-file stores
//! - `docpath-engine`: mutation and query engines, config, request context

pub use docpath_core::{
    flatten, flatten_rows, flatten_with_leaf_key, infer_value, parse_literal, refine, resolve,
    unflatten, unflatten_record, unflatten_with_report, ContainerPolicy, DocPath, Error,
    FieldFilter, FlatRecord, LimitError, MatchMode, Provenance, Refine, Result, Segment, SortBy,
    SortDirection, SortSpec, TextFilter, Value, ValueExt,
};
pub use docpath_engine::{
    AddColumnMode, AddOutcome, DeleteOutcome, DetailView, DocumentEngine, EngineConfig, Export,
    ExportFormat, FieldType, KeyValue, MutationEngine, QueryEngine, RequestContext, Role, Table,
    ViewContent,
};
pub use docpath_store::{
    import_documents, import_records, Document, DocumentId, DocumentStore, InMemoryStore,
    JsonFileStore, ID_FIELD,
};
