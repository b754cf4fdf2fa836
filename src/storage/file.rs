//! File-based document storage for Lectern.
//!
//! Each document is a JSON file under the store root; the document path maps
//! to nested directories (`lesson_sessions/s1` → `<root>/lesson_sessions/s1.json`).
//! Atomic writes are achieved via temp file + rename pattern.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

use crate::config::store_dir;
use crate::error::{LecternError, Result};
use crate::storage::document::{
    apply_set, apply_update, collection_segments, document_segments, Document, Filter, WriteMode,
};
use crate::storage::DocumentStore;

/// File-based document store.
///
/// Read-modify-write operations (merge, update) hold a process-local lock
/// for the duration of one call.
#[derive(Debug)]
pub struct FileDocumentStore {
    /// Directory where documents are stored.
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileDocumentStore {
    /// Create a new file store with the default directory.
    ///
    /// Uses `~/.lectern/store/` or `$LECTERN_HOME/store/`.
    pub fn new() -> Result<Self> {
        let dir = store_dir().ok_or_else(|| {
            LecternError::config("Could not determine store directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a new file store with a custom directory.
    pub fn with_dir(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| LecternError::storage(&root, e))?;
        }

        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the file path for a document.
    fn document_file(&self, path: &str) -> Result<PathBuf> {
        let segments = document_segments(path)?;
        let (id, parents) = segments
            .split_last()
            .ok_or_else(|| LecternError::validation("empty document path"))?;
        let mut file = self.root.clone();
        for segment in parents {
            file.push(segment);
        }
        file.push(format!("{}.json", id));
        Ok(file)
    }

    /// Get the path for a temp file used during atomic writes.
    fn temp_file(final_path: &Path) -> PathBuf {
        let name = final_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        final_path.with_file_name(format!(".{}.tmp", name))
    }

    fn read_file(&self, file: &Path) -> Result<Option<Document>> {
        if !file.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(file).map_err(|e| LecternError::storage(file, e))?;
        let document: Document = serde_json::from_str(&content).map_err(|e| {
            LecternError::persistence(format!("corrupt document {}: {}", file.display(), e))
        })?;
        Ok(Some(document))
    }

    /// Write a document atomically using temp file + rename.
    fn atomic_write(&self, final_path: &Path, document: &Document) -> Result<()> {
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent).map_err(|e| LecternError::storage(parent, e))?;
        }
        let temp_path = Self::temp_file(final_path);
        let json = serde_json::to_string_pretty(document)?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| LecternError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| LecternError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| LecternError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        fs::rename(&temp_path, final_path).map_err(|e| LecternError::storage(final_path, e))?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| LecternError::persistence("file store lock poisoned"))
    }
}

impl DocumentStore for FileDocumentStore {
    fn get(&self, path: &str) -> Result<Option<Document>> {
        let file = self.document_file(path)?;
        self.read_file(&file)
    }

    fn set(&self, path: &str, document: Document, mode: WriteMode) -> Result<()> {
        let file = self.document_file(path)?;
        let _guard = self.lock()?;
        let existing = match mode {
            WriteMode::Merge => self.read_file(&file)?,
            WriteMode::Overwrite => None,
        };
        let committed = apply_set(existing, document, mode, Utc::now());
        self.atomic_write(&file, &committed)
    }

    fn update(&self, path: &str, fields: Document) -> Result<()> {
        let file = self.document_file(path)?;
        let _guard = self.lock()?;
        let existing = self
            .read_file(&file)?
            .ok_or_else(|| LecternError::not_found("document", path))?;
        let committed = apply_update(existing, fields, Utc::now());
        self.atomic_write(&file, &committed)
    }

    fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<(String, Document)>> {
        let segments = collection_segments(collection)?;
        let dir = segments.iter().fold(self.root.clone(), |dir, s| dir.join(s));

        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|e| LecternError::storage(&dir, e))?;
        let mut results = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| LecternError::storage(&dir, e))?;
            let path = entry.path();

            // Skip non-JSON files and temp files
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            let Some(id) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            if id.starts_with('.') {
                continue;
            }

            match self.read_file(&path) {
                Ok(Some(doc)) if filter.matches(&doc) => results.push((id, doc)),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable document");
                }
            }
        }

        results.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(results)
    }
}
