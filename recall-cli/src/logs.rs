//! Log file setup.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use recall_lib::paths;
use simplelog::{Config, LevelFilter, WriteLogger};

/// Maximum number of old log files to keep.
const MAX_OLD_LOGS: usize = 25;

const LATEST: &str = "latest.log";

/// Rotate old logs and start logging to `latest.log` in the cache directory.
///
/// Logging is best effort: if the directory or file can't be created the
/// tool runs without a log.
pub fn init() {
    let Some(cache) = paths::cache_dir() else {
        return;
    };
    if fs::create_dir_all(&cache).is_err() {
        return;
    }
    rotate(&cache);

    if let Ok(file) = File::create(cache.join(LATEST)) {
        let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), file);
    }
}

/// Rename `latest.log` to a timestamped name and prune old logs.
fn rotate(dir: &Path) {
    let latest = dir.join(LATEST);
    if latest.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let _ = fs::rename(&latest, dir.join(format!("{}.log", timestamp)));
    }

    for stale in stale_logs(dir) {
        let _ = fs::remove_file(stale);
    }
}

/// Archived logs beyond the retention limit, oldest first.
fn stale_logs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut logs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != LATEST
        })
        .collect();
    logs.sort_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());

    let excess = logs.len().saturating_sub(MAX_OLD_LOGS);
    logs.into_iter().take(excess).map(|e| e.path()).collect()
}
