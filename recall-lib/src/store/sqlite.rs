//! SQLite-backed persistent history store.

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_sqlite::rusqlite;
use async_trait::async_trait;

use super::HistoryBackend;
use crate::error::HistoryError;

/// A persistent backend backed by SQLite.
///
/// Records live in a single `history` table and persist across process
/// restarts. File databases use WAL journal mode.
///
/// # Example
///
/// ```ignore
/// use recall_lib::store::SqliteBackend;
///
/// // File-based store
/// let backend = SqliteBackend::open("history.db").await?;
///
/// // In-memory store (for testing)
/// let backend = SqliteBackend::open_in_memory().await?;
/// ```
pub struct SqliteBackend {
    client: Client,
}

impl SqliteBackend {
    /// Opens a SQLite store at the specified path.
    ///
    /// Creates the database file and table if they don't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    /// Opens an in-memory SQLite store.
    pub async fn open_in_memory() -> Result<Self, HistoryError> {
        let client = ClientBuilder::new().path(":memory:").open().await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    async fn init_schema(client: &Client) -> Result<(), async_sqlite::Error> {
        client
            .conn(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS history (
                        key TEXT PRIMARY KEY,
                        value TEXT NOT NULL
                    )",
                    [],
                )?;
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl HistoryBackend for SqliteBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        let key = key.to_string();

        let value = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare("SELECT value FROM history WHERE key = ?")?;
                let mut rows = stmt.query([&key])?;
                match rows.next()? {
                    Some(row) => Ok(Some(row.get::<_, String>(0)?)),
                    None => Ok(None),
                }
            })
            .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), HistoryError> {
        let key = key.to_string();

        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT INTO history (key, value) VALUES (?, ?)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    rusqlite::params![key, value],
                )
            })
            .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), HistoryError> {
        let key = key.to_string();

        self.client
            .conn(move |conn| conn.execute("DELETE FROM history WHERE key = ?", [key]))
            .await?;

        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, HistoryError> {
        let keys = self
            .client
            .conn(|conn| {
                let mut stmt = conn.prepare("SELECT key FROM history ORDER BY key")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect::<Result<Vec<String>, _>>()
            })
            .await?;

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let backend = SqliteBackend::open_in_memory().await.unwrap();

        assert_eq!(backend.get("search_history_a").await.unwrap(), None);

        backend.set("search_history_a", "[\"x\"]".into()).await.unwrap();
        backend.set("search_history_a", "[\"y\"]".into()).await.unwrap();
        assert_eq!(
            backend.get("search_history_a").await.unwrap().as_deref(),
            Some("[\"y\"]")
        );

        backend.remove("search_history_a").await.unwrap();
        backend.remove("search_history_a").await.unwrap();
        assert_eq!(backend.get("search_history_a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_keys() {
        let backend = SqliteBackend::open_in_memory().await.unwrap();
        backend.set("search_history_b", "[]".into()).await.unwrap();
        backend.set("other", "1".into()).await.unwrap();
        backend.set("search_history_a", "[]".into()).await.unwrap();

        let keys = backend.list_keys().await.unwrap();
        assert_eq!(keys, vec!["other", "search_history_a", "search_history_b"]);
    }
}
