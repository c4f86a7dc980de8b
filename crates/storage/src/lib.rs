//! Document storage for docpath
//!
//! This crate implements the store the engine talks to:
//! - DocumentStore: the collaborator trait (by-id lookup, path mutations)
//! - DocumentId / Document: identity and the stored record
//! - InMemoryStore: RwLock-protected, MessagePack-encoded documents
//! - JsonFileStore: InMemoryStore persisted to a JSON array file
//! - import: seeding a collection from a JSON array file

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod file;
pub mod import;
pub mod memory;
pub mod traits;

pub use document::{Document, DocumentId, ID_FIELD};
pub use file::JsonFileStore;
pub use import::{import_documents, import_records};
pub use memory::InMemoryStore;
pub use traits::DocumentStore;
