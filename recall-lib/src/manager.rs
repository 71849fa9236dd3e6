//! Shared history service.

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::HistoryError;
use crate::paths;
use crate::store::{
    HistoryBackend, KEY_PREFIX, SqliteBackend, StorageMode, decode_history, encode_history,
    field_name_from_key, storage_key,
};

/// Coordinates access to field histories.
///
/// One manager is meant to be shared by every suggestion field in a process.
/// It is cheap to clone (uses `Arc` internally). Persistent histories are
/// read through a cache in front of the durable backend; temporary
/// histories only ever live in the manager's memory map.
///
/// The manager does not serialize calls: concurrent calls for the *same*
/// field name must be ordered by the caller. Calls for different fields are
/// independent.
///
/// # Example
///
/// ```ignore
/// use recall_lib::{HistoryManager, store::{MemoryBackend, StorageMode}};
///
/// let manager = HistoryManager::new(MemoryBackend::new());
/// manager
///     .save_history("search", vec!["apples".into()], StorageMode::Persistent)
///     .await?;
/// let history = manager.get_history("search", StorageMode::Persistent).await;
/// ```
#[derive(Clone)]
pub struct HistoryManager {
    inner: Arc<HistoryManagerInner>,
}

struct HistoryManagerInner {
    backend: Arc<dyn HistoryBackend>,
    /// Read-through cache of persistent histories, keyed by field name.
    cache: DashMap<String, Vec<String>>,
    /// Temporary histories, keyed by field name.
    temporary: DashMap<String, Vec<String>>,
}

impl std::fmt::Debug for HistoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryManager")
            .field("cached", &self.inner.cache.len())
            .field("temporary", &self.inner.temporary.len())
            .finish()
    }
}

impl HistoryManager {
    /// Create a manager over the given durable backend.
    pub fn new(backend: impl HistoryBackend + 'static) -> Self {
        Self::with_backend(Arc::new(backend))
    }

    /// Create a manager over a shared backend.
    pub fn with_backend(backend: Arc<dyn HistoryBackend>) -> Self {
        Self {
            inner: Arc::new(HistoryManagerInner {
                backend,
                cache: DashMap::new(),
                temporary: DashMap::new(),
            }),
        }
    }

    /// Open a manager backed by a SQLite database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let backend = SqliteBackend::open(path).await?;
        Ok(Self::new(backend))
    }

    /// Open a manager backed by the platform's default history database.
    pub async fn open_default() -> Result<Self, HistoryError> {
        let path = paths::history_db().ok_or(HistoryError::NoDataDir)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        log::debug!("Opening history database at {}", path.display());
        Self::open(path).await
    }

    /// Load a field's history, most recent first.
    ///
    /// Never fails: a missing record, an unreadable backend or a corrupt
    /// record all yield an empty list. Missing and corrupt records are
    /// cached as empty; backend errors are not cached so the next load
    /// retries.
    pub async fn get_history(&self, field_name: &str, mode: StorageMode) -> Vec<String> {
        match mode {
            StorageMode::Temporary => self
                .inner
                .temporary
                .get(field_name)
                .map(|entry| entry.value().clone())
                .unwrap_or_default(),
            StorageMode::Persistent => {
                if let Some(cached) = self.inner.cache.get(field_name) {
                    return cached.value().clone();
                }

                let key = storage_key(field_name);
                let entries = match self.inner.backend.get(&key).await {
                    Ok(Some(raw)) => match decode_history(&raw) {
                        Ok(entries) => entries,
                        Err(e) => {
                            log::warn!("Discarding corrupt history for '{}': {}", field_name, e);
                            Vec::new()
                        }
                    },
                    Ok(None) => Vec::new(),
                    Err(e) => {
                        log::warn!("Failed to load history for '{}': {}", field_name, e);
                        return Vec::new();
                    }
                };

                // A save issued while we were reading wins over what we read.
                self.inner
                    .cache
                    .entry(field_name.to_string())
                    .or_insert(entries)
                    .value()
                    .clone()
            }
        }
    }

    /// Store a field's history.
    ///
    /// The in-memory view (temporary map or persistent cache) is updated
    /// before this returns. The returned future performs the durable write;
    /// it is already complete for temporary histories. A failed write is
    /// logged and returned, but the cache keeps the new list.
    pub fn save_history(
        &self,
        field_name: &str,
        entries: Vec<String>,
        mode: StorageMode,
    ) -> BoxFuture<'static, Result<(), HistoryError>> {
        match mode {
            StorageMode::Temporary => {
                self.inner.temporary.insert(field_name.to_string(), entries);
                futures::future::ready(Ok(())).boxed()
            }
            StorageMode::Persistent => {
                let raw = encode_history(&entries);
                self.inner.cache.insert(field_name.to_string(), entries);

                let backend = Arc::clone(&self.inner.backend);
                let field_name = field_name.to_string();
                async move {
                    let result = match raw {
                        Ok(raw) => backend.set(&storage_key(&field_name), raw).await,
                        Err(e) => Err(e),
                    };
                    if let Err(ref e) = result {
                        log::warn!("Failed to save history for '{}': {}", field_name, e);
                    }
                    result
                }
                .boxed()
            }
        }
    }

    /// Remove one field's history.
    pub async fn clear_history(
        &self,
        field_name: &str,
        mode: StorageMode,
    ) -> Result<(), HistoryError> {
        match mode {
            StorageMode::Temporary => {
                self.inner.temporary.remove(field_name);
                Ok(())
            }
            StorageMode::Persistent => {
                self.inner.cache.remove(field_name);
                self.inner.backend.remove(&storage_key(field_name)).await
            }
        }
    }

    /// Remove every history stored under `mode`.
    ///
    /// For persistent histories this deletes every durable key in the
    /// history namespace, including ones this process never loaded.
    pub async fn clear_all_histories(&self, mode: StorageMode) -> Result<(), HistoryError> {
        match mode {
            StorageMode::Temporary => {
                self.inner.temporary.clear();
                Ok(())
            }
            StorageMode::Persistent => {
                self.inner.cache.clear();
                let keys: Vec<String> = self
                    .inner
                    .backend
                    .list_keys()
                    .await?
                    .into_iter()
                    .filter(|key| key.starts_with(KEY_PREFIX))
                    .collect();

                log::debug!("Clearing {} persistent histories", keys.len());
                let backend = &self.inner.backend;
                futures::future::try_join_all(keys.iter().map(|key| backend.remove(key))).await?;
                Ok(())
            }
        }
    }

    /// Names of the fields that currently hold a history under `mode`.
    pub async fn fields(&self, mode: StorageMode) -> Result<Vec<String>, HistoryError> {
        let mut names: Vec<String> = match mode {
            StorageMode::Temporary => self
                .inner
                .temporary
                .iter()
                .map(|entry| entry.key().clone())
                .collect(),
            StorageMode::Persistent => self
                .inner
                .backend
                .list_keys()
                .await?
                .iter()
                .filter_map(|key| field_name_from_key(key).map(str::to_string))
                .collect(),
        };
        names.sort();
        Ok(names)
    }

    /// Check whether a persistent history is currently cached.
    pub fn is_cached(&self, field_name: &str) -> bool {
        self.inner.cache.contains_key(field_name)
    }
}
