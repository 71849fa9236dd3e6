//! History storage error types

/// Errors that can occur while reading or writing field histories.
///
/// The manager recovers from most of these locally (a failed load becomes an
/// empty history); they surface only from the lower-level backend API and
/// from save futures.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The SQLite backend failed.
    #[error("database error: {0}")]
    Database(#[from] async_sqlite::Error),

    /// A history list could not be serialized.
    #[error("failed to encode history: {0}")]
    Encode(#[source] serde_json::Error),

    /// A stored record is not a JSON array of strings.
    #[error("failed to decode history record: {0}")]
    Decode(#[source] serde_json::Error),

    /// Filesystem error while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No platform data directory could be determined.
    #[error("no data directory available for this platform")]
    NoDataDir,
}

impl HistoryError {
    /// Returns `true` if this error came from a malformed stored record.
    pub fn is_corrupt_record(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
