//! In-memory document storage.
//!
//! This module provides a thread-safe in-memory implementation of the
//! DocumentStore trait, used by tests and the `memory` store backend.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::error::{LecternError, Result};
use crate::storage::document::{
    apply_set, apply_update, collection_segments, document_segments, Document, Filter, WriteMode,
};
use crate::storage::DocumentStore;

/// In-memory document store.
///
/// Thread-safe implementation using `RwLock<BTreeMap>`.
/// Documents are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    /// Documents keyed by full path.
    documents: RwLock<BTreeMap<String, Document>>,
}

impl MemoryDocumentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of documents in the store.
    pub fn len(&self) -> usize {
        self.read().map(|docs| docs.len()).unwrap_or(0)
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every document.
    pub fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Document>>> {
        self.documents
            .read()
            .map_err(|_| LecternError::persistence("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, Document>>> {
        self.documents
            .write()
            .map_err(|_| LecternError::persistence("memory store lock poisoned"))
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, path: &str) -> Result<Option<Document>> {
        document_segments(path)?;
        Ok(self.read()?.get(path).cloned())
    }

    fn set(&self, path: &str, document: Document, mode: WriteMode) -> Result<()> {
        document_segments(path)?;
        let mut docs = self.write()?;
        let committed = apply_set(docs.remove(path), document, mode, Utc::now());
        docs.insert(path.to_string(), committed);
        Ok(())
    }

    fn update(&self, path: &str, fields: Document) -> Result<()> {
        document_segments(path)?;
        let mut docs = self.write()?;
        let existing = docs
            .remove(path)
            .ok_or_else(|| LecternError::not_found("document", path))?;
        docs.insert(path.to_string(), apply_update(existing, fields, Utc::now()));
        Ok(())
    }

    fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<(String, Document)>> {
        collection_segments(collection)?;
        let prefix = format!("{}/", collection);
        let docs = self.read()?;

        Ok(docs
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter_map(|(path, doc)| {
                let id = &path[prefix.len()..];
                (!id.contains('/') && filter.matches(doc)).then(|| (id.to_string(), doc.clone()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::tests::test_document_store_contract;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_memory_store_contract() {
        let store = MemoryDocumentStore::new();
        test_document_store_contract(&store);
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = MemoryDocumentStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_len_and_clear() {
        let store = MemoryDocumentStore::new();
        store
            .set("a/1", doc(json!({"x": 1})), WriteMode::Overwrite)
            .unwrap();
        store
            .set("a/2", doc(json!({"x": 2})), WriteMode::Overwrite)
            .unwrap();
        assert_eq!(store.len(), 2);

        store.clear().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_query_skips_grandchildren() {
        let store = MemoryDocumentStore::new();
        store
            .set("a/1", doc(json!({"x": 1})), WriteMode::Overwrite)
            .unwrap();
        store
            .set("a/1/b/2", doc(json!({"x": 2})), WriteMode::Overwrite)
            .unwrap();
        store
            .set("ab/3", doc(json!({"x": 3})), WriteMode::Overwrite)
            .unwrap();

        let results = store.query("a", &Filter::all()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "1");
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryDocumentStore::new());
        let mut handles = vec![];

        for i in 0..10 {
            let store_clone = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                let path = format!("lesson_sessions/s{}", i);
                store_clone
                    .set(&path, doc(json!({"i": i})), WriteMode::Overwrite)
                    .unwrap();
                store_clone.get(&path).unwrap();
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 10);
    }
}
