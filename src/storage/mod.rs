//! Origin-scoped key-value storage backing the session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mirrors the browser `localStorage` contract: string keys, string values,
//! synchronous access, one namespace per API origin. `FileStorage` is the
//! durable backend used by the CLI; `MemoryStorage` serves tests and
//! throwaway sessions.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use reqwest::Url;

use crate::error::StorageError;

/// Synchronous string key-value store scoped to one origin.
///
/// Reads are infallible: an unreadable backend reads as empty.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns an error if the value could not be persisted.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Write several entries as one unit: either all land or none do.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch could not be persisted; prior values are kept.
    fn set_items(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns an error if the removal could not be persisted.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Remove every entry in this origin's namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend could not be emptied.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Filesystem-safe namespace for an origin, e.g. `https_example.com_443`.
#[must_use]
pub fn origin_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or("local");
    let port = url.port_or_known_default().map_or_else(String::new, |p| format!("_{p}"));
    let raw = format!("{}_{host}{port}", url.scheme());
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect()
}
