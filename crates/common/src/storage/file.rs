//! JSON-file storage backend
//!
//! All entries live in one JSON object. Writes go to a temporary file in the
//! same directory which is then renamed over the target, so a crash never
//! leaves a half-written document behind. `tempfile` creates that file with
//! owner-only permissions on Unix.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::debug;

use super::{KeyValueStore, StorageError, StorageResult};

type Document = BTreeMap<String, String>;

/// File-backed [`KeyValueStore`].
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    document: Mutex<Option<Document>>,
}

impl FileStore {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), document: Mutex::new(None) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> StorageResult<Document> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Document::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                StorageError::Corrupt(format!("{}: {err}", self.path.display()))
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Document::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_document(&self, document: &Document) -> StorageResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(&serde_json::to_vec_pretty(document)?)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|err| StorageError::Io(err.error))?;

        debug!(path = %self.path.display(), entries = document.len(), "Storage document written");
        Ok(())
    }

    /// Apply `change` to a copy of the document and commit it only once the
    /// file write succeeded.
    fn update(&self, change: impl FnOnce(&mut Document)) -> StorageResult<()> {
        let mut guard = self.document.lock();
        let mut next = match guard.as_ref() {
            Some(document) => document.clone(),
            None => self.read_document()?,
        };
        change(&mut next);
        self.write_document(&next)?;
        *guard = Some(next);
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let mut guard = self.document.lock();
        if guard.is_none() {
            *guard = Some(self.read_document()?);
        }
        Ok(guard.as_ref().and_then(|document| document.get(key).cloned()))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.update(|document| {
            document.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.update(|document| {
            document.remove(key);
        })
    }
}
