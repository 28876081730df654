//! Draft persistence.
//!
//! Two layers:
//! - `KeyValueStore`: a string key-value slot store, the local equivalent of
//!   a browser's local storage. `MemoryStore` and `FileStore` implement it.
//! - `DraftStore`: saves, loads and clears the single in-progress
//!   `RegistrationRecord`. `LocalDraftStore` implements it on top of any
//!   `KeyValueStore`, keeping the record as JSON under one fixed key.
//!
//! Reads never fail: absent or unparsable data loads as "no draft".

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::record::RegistrationRecord;

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "multiStepFormData";

/// Errors from a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("draft serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

/// A string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process store backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        // Replace atomically via a sibling temp file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Persistence for the single in-progress registration draft.
pub trait DraftStore {
    /// Overwrite the stored draft with `record`.
    fn save(&mut self, record: &RegistrationRecord) -> Result<(), StorageError>;

    /// The stored draft, or `None` if absent or unreadable.
    fn load(&self) -> Option<RegistrationRecord>;

    /// Delete the stored draft. Idempotent.
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// `DraftStore` keeping the record as JSON under one key of a `KeyValueStore`.
#[derive(Debug, Clone)]
pub struct LocalDraftStore<B: KeyValueStore> {
    backend: B,
    key: String,
}

impl<B: KeyValueStore> LocalDraftStore<B> {
    /// Use `backend` with the default storage key.
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

impl<B: KeyValueStore> DraftStore for LocalDraftStore<B> {
    fn save(&mut self, record: &RegistrationRecord) -> Result<(), StorageError> {
        let json = serde_json::to_string(record)?;
        self.backend.set(&self.key, &json)?;
        debug!(key = %self.key, fields = record.len(), "Draft saved");
        Ok(())
    }

    fn load(&self) -> Option<RegistrationRecord> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, "Failed to read draft, starting fresh: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key = %self.key, "Ignoring unparsable draft: {}", e);
                None
            }
        }
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.backend.remove(&self.key)?;
        debug!(key = %self.key, "Draft cleared");
        Ok(())
    }
}
