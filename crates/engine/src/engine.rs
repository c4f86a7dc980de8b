//! DocumentEngine: opens a data directory and wires the engines to its store
//!
//! On open, a default `docpath.toml` is written if missing, then the
//! collection named by `data_file` is loaded from the same directory.

use crate::config::{EngineConfig, CONFIG_FILE_NAME};
use crate::context::RequestContext;
use crate::mutation::MutationEngine;
use crate::query::QueryEngine;
use docpath_core::Result;
use docpath_store::{DocumentStore, InMemoryStore, JsonFileStore};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Query and mutation access over one store
#[derive(Clone)]
pub struct DocumentEngine {
    store: Arc<dyn DocumentStore>,
    query: QueryEngine,
    mutation: MutationEngine,
}

impl DocumentEngine {
    /// Wire both engines to an existing store
    pub fn new(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Self {
        DocumentEngine {
            query: QueryEngine::new(store.clone(), config.clone()),
            mutation: MutationEngine::new(store.clone(), config),
            store,
        }
    }

    /// Open a data directory, creating its config file if missing
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let config_path = dir.join(CONFIG_FILE_NAME);
        EngineConfig::write_default_if_missing(&config_path)?;
        let config = EngineConfig::from_file(&config_path)?;

        let store = JsonFileStore::open(dir.join(&config.data_file))?;
        info!(dir = %dir.display(), data_file = %config.data_file, "Document engine opened");
        Ok(Self::new(Arc::new(store), config))
    }

    /// An engine over a fresh in-memory store with default settings
    pub fn ephemeral() -> Self {
        Self::new(Arc::new(InMemoryStore::new()), EngineConfig::default())
    }

    /// Replace the collection with the records of a JSON array file
    ///
    /// Requires an admin context, like every other mutation.
    pub fn import(&self, ctx: &RequestContext, source: impl AsRef<Path>) -> Result<usize> {
        self.mutation.import(ctx, source.as_ref())
    }

    /// Read access
    pub fn query(&self) -> &QueryEngine {
        &self.query
    }

    /// Write access
    pub fn mutation(&self) -> &MutationEngine {
        &self.mutation
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }
}
