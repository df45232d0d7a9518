//! In-memory storage backend for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::Mutex;

use super::Storage;
use crate::error::StorageError;

/// Process-local store. Contents vanish when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn set_items(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut map = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        for (key, value) in entries {
            map.insert((*key).to_owned(), (*value).to_owned());
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().map_err(|_| StorageError::Poisoned)?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries.lock().map_err(|_| StorageError::Poisoned)?.clear();
        Ok(())
    }
}
