//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "norpie";
const APPLICATION: &str = "recall";

/// Get project directories, or None if home directory cannot be determined.
fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Get the data directory for persistent histories.
///
/// - Linux: `$XDG_DATA_HOME/recall` or `~/.local/share/recall`
/// - macOS: `~/Library/Application Support/dev.norpie.recall`
/// - Windows: `C:\Users\<User>\AppData\Roaming\norpie\recall\data`
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Get the cache directory, used for log files.
///
/// - Linux: `$XDG_CACHE_HOME/recall` or `~/.cache/recall`
/// - macOS: `~/Library/Caches/dev.norpie.recall`
/// - Windows: `C:\Users\<User>\AppData\Local\norpie\recall\cache`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Get the path to the history database.
pub fn history_db() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("history.db"))
}
