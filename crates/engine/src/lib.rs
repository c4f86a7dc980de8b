//! Document engine for docpath
//!
//! This crate orchestrates path-addressed edits and queries over a
//! [`DocumentStore`](docpath_store::DocumentStore):
//! - MutationEngine: add_key, append_item, add_column, delete_at, add_any
//! - QueryEngine: list, get, nth, view, columns, field_types, export
//! - RequestContext: explicit per-request role
//! - EngineConfig: `docpath.toml`
//! - DocumentEngine: opens a data directory and wires it all together
//!
//! Engines hold no documents between calls; the store is the only source of
//! truth.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod engine;
pub mod mutation;
pub mod query;
pub mod view;

pub use config::{AddColumnMode, EngineConfig, CONFIG_FILE_NAME};
pub use context::{RequestContext, Role};
pub use engine::DocumentEngine;
pub use mutation::{AddOutcome, DeleteOutcome, KeyValue, MutationEngine};
pub use query::QueryEngine;
pub use view::{DetailView, Export, ExportFormat, FieldType, Table, ViewContent};
