//! Search history storage
//!
//! Per-field, most-recent-first history lists with an in-memory mode and a
//! durable mode backed by a key-value store.

pub mod error;
pub mod history;
pub mod paths;
pub mod store;

mod manager;

pub use error::HistoryError;
pub use history::{DEFAULT_MAX_HISTORY_ITEMS, FieldHistory};
pub use manager::*;
pub use store::StorageMode;
