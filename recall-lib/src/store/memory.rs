//! In-memory history backend using DashMap

use async_trait::async_trait;
use dashmap::DashMap;

use super::HistoryBackend;
use crate::error::HistoryError;

/// An in-memory backend backed by a concurrent hash map.
///
/// Data is lost when the backend is dropped. Useful as the durable store in
/// tests, where dropping the `HistoryManager` but keeping the backend
/// simulates a process restart.
///
/// # Example
///
/// ```
/// use recall_lib::store::MemoryBackend;
///
/// let backend = MemoryBackend::new();
/// assert!(backend.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: DashMap<String, String>,
}

impl MemoryBackend {
    /// Creates a new empty backend.
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Read a record without going through the async trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.store.get(key).map(|entry| entry.value().clone())
    }

    /// Write a record directly, bypassing the codec.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.store.insert(key.into(), value.into());
    }
}

#[async_trait]
impl HistoryBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), HistoryError> {
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), HistoryError> {
        self.store.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, HistoryError> {
        Ok(self.store.iter().map(|entry| entry.key().clone()).collect())
    }
}
