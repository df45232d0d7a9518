//! Durable storage backend: one JSON object file per origin.
//!
//! DESIGN
//! ======
//! Every mutation rewrites the whole file through a uniquely named temp file
//! followed by a rename, so a crash never leaves a half-written session
//! behind. A missing or corrupt file reads as an empty namespace.

#[cfg(test)]
#[path = "file_test.rs"]
mod file_test;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use reqwest::Url;

use super::{Storage, origin_key};
use crate::error::StorageError;

type Entries = BTreeMap<String, String>;

/// File-backed store for a single origin.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Storage for `origin`, kept under `dir`. The directory is created on first write.
    #[must_use]
    pub fn for_origin(dir: &Path, origin: &Url) -> Self {
        Self::at_path(dir.join(format!("{}.json", origin_key(origin))))
    }

    /// Storage backed by an explicit file path.
    #[must_use]
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Entries {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Entries::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "storage file unreadable; treating as empty");
                return Entries::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "storage file corrupt; treating as empty");
            Entries::new()
        })
    }

    fn persist(&self, entries: &Entries) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io { path: self.path.display().to_string(), source };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        std::fs::write(&tmp, raw).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            io_err(e)
        })
    }

    fn mutate(&self, f: impl FnOnce(&mut Entries)) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.load();
        f(&mut entries);
        self.persist(&entries)
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().ok()?;
        self.load().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.mutate(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    fn set_items(&self, batch: &[(&str, &str)]) -> Result<(), StorageError> {
        self.mutate(|entries| {
            for (key, value) in batch {
                entries.insert((*key).to_owned(), (*value).to_owned());
            }
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io { path: self.path.display().to_string(), source: e }),
        }
    }
}
