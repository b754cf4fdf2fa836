//! Document storage for Lectern.
//!
//! This module provides the document store contract every component reads
//! and writes through, with file-based and in-memory backends.

pub mod document;
pub mod file;
pub mod memory;
pub mod paths;
pub mod traits;

use std::sync::Arc;

pub use document::{
    deep_merge, from_document, server_timestamp, to_document, Document, Filter, WriteMode,
};
pub use file::FileDocumentStore;
pub use memory::MemoryDocumentStore;
pub use traits::{DocumentStore, DocumentStoreExt};

use crate::config::{StoreBackend, StoreConfig};
use crate::error::Result;

/// Open the store selected by configuration.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("using in-memory document store");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        StoreBackend::File => {
            let store = match &config.dir {
                Some(dir) => FileDocumentStore::with_dir(dir)?,
                None => FileDocumentStore::new()?,
            };
            tracing::info!(root = %store.root().display(), "using file document store");
            Ok(Arc::new(store))
        }
    }
}
