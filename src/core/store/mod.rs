//! Key-value storage backends
//!
//! The repository persists each collection as one JSON document under a
//! well-known key. Anything that can get, put, remove and list string values
//! by key can back it:
//!
//! - [`MemoryStore`] - in-process map, for tests and ephemeral hosts
//! - [`JsonFileStore`] - one `<key>.json` file per key in a directory
//! - [`SqliteStore`] - a single `collections` table

mod json;
mod sqlite;

#[cfg(test)]
mod tests;

pub use json::JsonFileStore;
pub use sqlite::SqliteStore;

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to replace {target_path} with {temp_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Stored value for '{key}' is not valid UTF-8")]
    InvalidEncoding {
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Invalid storage key '{0}': use lowercase letters, digits, '_' or '-'")]
    InvalidKey(String),
}

/// Durable string storage keyed by name
///
/// Writes must be visible to a following `get` on the same store before
/// `put`/`remove` return.
pub trait KeyValueStore {
    /// Read a value; `Ok(None)` when the key was never written.
    ///
    /// A stored value that is not text is [`StoreError::InvalidEncoding`],
    /// so callers can tell a corrupt payload from a failing store.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write (or overwrite) a value
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// All keys currently present, sorted
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Keys become file names, so keep them to a safe alphabet
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}
