//! Document store traits for Lectern.
//!
//! This module defines the `DocumentStore` trait every persistence backend
//! implements, plus typed helpers layered on top of it.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::storage::document::{from_document, to_document, Document, Filter, WriteMode};

/// Trait for document store backends.
///
/// Paths alternate collection and document ids. Sentinels produced by
/// [`server_timestamp`](crate::storage::server_timestamp) are resolved at
/// commit time.
pub trait DocumentStore: Send + Sync {
    /// Retrieve a document.
    ///
    /// Returns `Ok(None)` if the document doesn't exist.
    fn get(&self, path: &str) -> Result<Option<Document>>;

    /// Write a document, either replacing or deep-merging into it.
    fn set(&self, path: &str, document: Document, mode: WriteMode) -> Result<()>;

    /// Replace top-level fields of an existing document.
    ///
    /// Fails with `NotFound` if the document doesn't exist.
    fn update(&self, path: &str, fields: Document) -> Result<()>;

    /// List the direct children of a collection matching `filter`.
    ///
    /// Results are `(document id, document)` pairs ordered by id.
    fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<(String, Document)>>;

    /// Check if a document exists.
    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.get(path)?.is_some())
    }
}

/// Blanket implementation of DocumentStore for Arc-wrapped stores.
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    fn get(&self, path: &str) -> Result<Option<Document>> {
        (**self).get(path)
    }

    fn set(&self, path: &str, document: Document, mode: WriteMode) -> Result<()> {
        (**self).set(path, document, mode)
    }

    fn update(&self, path: &str, fields: Document) -> Result<()> {
        (**self).update(path, fields)
    }

    fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<(String, Document)>> {
        (**self).query(collection, filter)
    }
}

/// Typed access to a [`DocumentStore`].
pub trait DocumentStoreExt: DocumentStore {
    /// Read and deserialize a document.
    fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        self.get(path)?.map(from_document).transpose()
    }

    /// Serialize and write a record.
    fn set_as<T: Serialize>(&self, path: &str, record: &T, mode: WriteMode) -> Result<()> {
        self.set(path, to_document(record)?, mode)
    }
}

impl<S: DocumentStore + ?Sized> DocumentStoreExt for S {}
