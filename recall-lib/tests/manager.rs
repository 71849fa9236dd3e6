use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use recall_lib::store::{HistoryBackend, MemoryBackend, SqliteBackend, storage_key};
use recall_lib::{HistoryError, HistoryManager, StorageMode};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Backend whose reads and writes always fail, counting the attempts.
#[derive(Default)]
struct BrokenBackend {
    reads: AtomicUsize,
    writes: AtomicUsize,
}

fn broken() -> HistoryError {
    HistoryError::Io(std::io::Error::other("disk unplugged"))
}

#[async_trait]
impl HistoryBackend for BrokenBackend {
    async fn get(&self, _key: &str) -> Result<Option<String>, HistoryError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Err(broken())
    }

    async fn set(&self, _key: &str, _value: String) -> Result<(), HistoryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(broken())
    }

    async fn remove(&self, _key: &str) -> Result<(), HistoryError> {
        Err(broken())
    }

    async fn list_keys(&self) -> Result<Vec<String>, HistoryError> {
        Err(broken())
    }
}

// =============================================================================
// Persistent mode
// =============================================================================

#[tokio::test]
async fn test_persistent_survives_restart() {
    let backend = Arc::new(MemoryBackend::new());

    let manager = HistoryManager::with_backend(backend.clone());
    manager
        .save_history("search", strings(&["bananas", "apples"]), StorageMode::Persistent)
        .await
        .unwrap();
    drop(manager);

    // Fresh manager, empty cache, same durable store.
    let restarted = HistoryManager::with_backend(backend.clone());
    assert!(!restarted.is_cached("search"));
    assert_eq!(
        restarted.get_history("search", StorageMode::Persistent).await,
        strings(&["bananas", "apples"])
    );
    assert_eq!(
        backend.raw(&storage_key("search")).as_deref(),
        Some(r#"["bananas","apples"]"#)
    );
}

#[tokio::test]
async fn test_cached_reads_skip_backend() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_raw(storage_key("search"), r#"["one"]"#);

    let manager = HistoryManager::with_backend(backend.clone());
    assert_eq!(manager.get_history("search", StorageMode::Persistent).await, strings(&["one"]));

    // Changing the store behind the manager's back is not observed.
    backend.insert_raw(storage_key("search"), r#"["two"]"#);
    assert_eq!(manager.get_history("search", StorageMode::Persistent).await, strings(&["one"]));
}

#[tokio::test]
async fn test_corrupt_record_recovers_to_empty() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_raw(storage_key("search"), "{not valid json");

    let manager = HistoryManager::with_backend(backend.clone());
    assert!(manager.get_history("search", StorageMode::Persistent).await.is_empty());
    assert!(manager.is_cached("search"));

    // The next save replaces the corrupt record.
    manager
        .save_history("search", strings(&["fresh"]), StorageMode::Persistent)
        .await
        .unwrap();
    assert_eq!(backend.raw(&storage_key("search")).as_deref(), Some(r#"["fresh"]"#));
}

#[tokio::test]
async fn test_wrong_shape_record_recovers_to_empty() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_raw(storage_key("search"), "[1, 2, 3]");

    let manager = HistoryManager::with_backend(backend);
    assert!(manager.get_history("search", StorageMode::Persistent).await.is_empty());
}

#[tokio::test]
async fn test_clear_history_invalidates_cache() {
    let backend = Arc::new(MemoryBackend::new());
    let manager = HistoryManager::with_backend(backend.clone());
    manager
        .save_history("search", strings(&["a"]), StorageMode::Persistent)
        .await
        .unwrap();

    manager.clear_history("search", StorageMode::Persistent).await.unwrap();

    assert!(!manager.is_cached("search"));
    assert!(backend.raw(&storage_key("search")).is_none());
    assert!(manager.get_history("search", StorageMode::Persistent).await.is_empty());
}

#[tokio::test]
async fn test_clear_all_only_touches_namespace() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_raw("unrelated.setting", "keep me");
    backend.insert_raw(storage_key("never_loaded"), r#"["old"]"#);

    let manager = HistoryManager::with_backend(backend.clone());
    manager
        .save_history("search", strings(&["a"]), StorageMode::Persistent)
        .await
        .unwrap();

    manager.clear_all_histories(StorageMode::Persistent).await.unwrap();

    assert_eq!(backend.len(), 1);
    assert_eq!(backend.raw("unrelated.setting").as_deref(), Some("keep me"));
    assert!(manager.get_history("search", StorageMode::Persistent).await.is_empty());
}

#[tokio::test]
async fn test_fields_lists_persistent_histories() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_raw("unrelated.setting", "x");
    let manager = HistoryManager::with_backend(backend);
    manager
        .save_history("zip", strings(&["1"]), StorageMode::Persistent)
        .await
        .unwrap();
    manager
        .save_history("city", strings(&["2"]), StorageMode::Persistent)
        .await
        .unwrap();

    assert_eq!(
        manager.fields(StorageMode::Persistent).await.unwrap(),
        strings(&["city", "zip"])
    );
}

#[tokio::test]
async fn test_sqlite_backend_through_manager() {
    let manager = HistoryManager::new(SqliteBackend::open_in_memory().await.unwrap());
    manager
        .save_history("search", strings(&["apples"]), StorageMode::Persistent)
        .await
        .unwrap();
    manager.clear_history("other", StorageMode::Persistent).await.unwrap();

    assert_eq!(manager.fields(StorageMode::Persistent).await.unwrap(), strings(&["search"]));
}

// =============================================================================
// Temporary mode
// =============================================================================

#[tokio::test]
async fn test_temporary_never_touches_backend() {
    let backend = Arc::new(MemoryBackend::new());
    let manager = HistoryManager::with_backend(backend.clone());

    manager
        .save_history("search", strings(&["a", "b"]), StorageMode::Temporary)
        .await
        .unwrap();
    assert_eq!(manager.get_history("search", StorageMode::Temporary).await, strings(&["a", "b"]));
    assert!(backend.is_empty());

    // The same field name in persistent mode is a separate history.
    assert!(manager.get_history("search", StorageMode::Persistent).await.is_empty());

    manager.clear_all_histories(StorageMode::Temporary).await.unwrap();
    assert!(manager.get_history("search", StorageMode::Temporary).await.is_empty());
    assert!(backend.is_empty());
}

#[tokio::test]
async fn test_temporary_lost_on_restart() {
    let backend = Arc::new(MemoryBackend::new());
    let manager = HistoryManager::with_backend(backend.clone());
    manager
        .save_history("search", strings(&["a"]), StorageMode::Temporary)
        .await
        .unwrap();
    drop(manager);

    let restarted = HistoryManager::with_backend(backend);
    assert!(restarted.get_history("search", StorageMode::Temporary).await.is_empty());
}

#[tokio::test]
async fn test_temporary_clear_single_field() {
    let manager = HistoryManager::new(MemoryBackend::new());
    manager
        .save_history("a", strings(&["1"]), StorageMode::Temporary)
        .await
        .unwrap();
    manager
        .save_history("b", strings(&["2"]), StorageMode::Temporary)
        .await
        .unwrap();

    manager.clear_history("a", StorageMode::Temporary).await.unwrap();

    assert!(manager.get_history("a", StorageMode::Temporary).await.is_empty());
    assert_eq!(manager.get_history("b", StorageMode::Temporary).await, strings(&["2"]));
}

// =============================================================================
// Failing backend
// =============================================================================

#[tokio::test]
async fn test_load_failure_degrades_and_retries() {
    let backend = Arc::new(BrokenBackend::default());
    let manager = HistoryManager::with_backend(backend.clone());

    assert!(manager.get_history("search", StorageMode::Persistent).await.is_empty());
    assert!(!manager.is_cached("search"));
    assert!(manager.get_history("search", StorageMode::Persistent).await.is_empty());
    assert_eq!(backend.reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_save_failure_keeps_cache() {
    let backend = Arc::new(BrokenBackend::default());
    let manager = HistoryManager::with_backend(backend.clone());

    let result = manager
        .save_history("search", strings(&["kept"]), StorageMode::Persistent)
        .await;

    assert!(result.is_err());
    assert_eq!(backend.writes.load(Ordering::SeqCst), 1);
    assert_eq!(manager.get_history("search", StorageMode::Persistent).await, strings(&["kept"]));
    assert_eq!(backend.reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_clear_all_reports_listing_failure() {
    let manager = HistoryManager::with_backend(Arc::new(BrokenBackend::default()));
    assert!(manager.clear_all_histories(StorageMode::Persistent).await.is_err());
    // Temporary mode never consults the backend.
    assert!(manager.clear_all_histories(StorageMode::Temporary).await.is_ok());
}
