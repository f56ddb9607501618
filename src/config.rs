//! Logging configuration read from the environment.
//!
//! | variable        | default | meaning                                     |
//! |-----------------|---------|---------------------------------------------|
//! | `RUST_LOG`      | `warn`  | filter for the stderr log                   |
//! | `RUST_LOG_JSON` | `debug` | filter for the JSON log file                |
//! | `LOG_FILE_PATH` | unset   | daily-rolling JSON log file; off when unset |

use std::path::{Path, PathBuf};

pub const DEFAULT_STDERR_FILTER: &str = "warn";
pub const DEFAULT_JSON_FILTER: &str = "debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub stderr_filter: String,
    pub json_filter: String,
    pub file_path: Option<PathBuf>,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Empty values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            stderr_filter: get("RUST_LOG").unwrap_or_else(|| DEFAULT_STDERR_FILTER.to_string()),
            json_filter: get("RUST_LOG_JSON").unwrap_or_else(|| DEFAULT_JSON_FILTER.to_string()),
            file_path: get("LOG_FILE_PATH").map(PathBuf::from),
        }
    }

    /// Splits the log file path into the directory and file name prefix the
    /// rolling appender wants.
    pub fn file_parts(&self) -> Option<(&Path, &Path)> {
        let path = self.file_path.as_deref()?;
        let file_name = Path::new(path.file_name()?);
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Some((dir, file_name))
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
