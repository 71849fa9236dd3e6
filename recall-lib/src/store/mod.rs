//! Durable key-value storage for field histories.
//!
//! Provides the `HistoryBackend` trait plus an in-memory and a SQLite
//! implementation. Every key written by this crate starts with
//! [`KEY_PREFIX`], so all histories can be enumerated for bulk clearing.

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

/// Namespace prefix shared by all history records.
pub const KEY_PREFIX: &str = "search_history_";

/// Where a field's history is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageMode {
    /// Stored in the durable backend; survives process restarts.
    #[default]
    Persistent,
    /// Kept in process memory only.
    Temporary,
}

/// Build the durable key for a field name.
pub fn storage_key(field_name: &str) -> String {
    format!("{}{}", KEY_PREFIX, field_name)
}

/// Recover the field name from a durable key.
///
/// Returns `None` for keys outside the history namespace.
pub fn field_name_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(KEY_PREFIX)
}

/// Serialize a history as a JSON array of strings, most recent first.
pub fn encode_history(entries: &[String]) -> Result<String, HistoryError> {
    serde_json::to_string(entries).map_err(HistoryError::Encode)
}

/// Parse a stored history record.
///
/// Anything other than a JSON array of strings is a decode error; the
/// manager turns that into an empty history.
pub fn decode_history(raw: &str) -> Result<Vec<String>, HistoryError> {
    serde_json::from_str(raw).map_err(HistoryError::Decode)
}

/// Backend trait for history storage.
///
/// Implementations store raw string records by key. The `HistoryManager`
/// wraps this with the history codec and a read-through cache.
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Get the record stored under a key.
    async fn get(&self, key: &str) -> Result<Option<String>, HistoryError>;

    /// Store a record, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), HistoryError>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), HistoryError>;

    /// List every key in the store.
    async fn list_keys(&self) -> Result<Vec<String>, HistoryError>;
}
