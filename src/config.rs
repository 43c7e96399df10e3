//! Backend location and connection options.
//!
//! ```rust
//! use kvgraph::{BackendConfig, KvBackend};
//!
//! let backend = KvBackend::open_with(&BackendConfig::in_memory())?;
//! assert!(backend.location().is_none());
//! # Ok::<(), kvgraph::KvGraphError>(())
//! ```

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

/// Environment variable naming the database file, or `memory`.
pub const DB_ENV_VAR: &str = "KVGRAPH_DB";

const DEFAULT_DIR: &str = "graph";
const DEFAULT_FILE: &str = "db.data";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendConfig {
    /// Database file; `None` keeps everything in memory.
    pub path: Option<PathBuf>,
    /// How long a write waits for another process holding the file lock.
    pub busy_timeout: Duration,
    /// Prepared statements kept per connection.
    pub statement_cache_capacity: usize,
    /// Create missing parent directories of `path` on open.
    pub create_dirs: bool,
    /// Use SQLite's write-ahead log for file databases.
    pub wal: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout: Duration::from_secs(5),
            statement_cache_capacity: 64,
            create_dirs: true,
            wal: true,
        }
    }
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn at<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// `$HOME/graph/db.data`, or `./graph/db.data` without a home directory.
    pub fn default_location() -> Self {
        let base = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::at(base.join(DEFAULT_DIR).join(DEFAULT_FILE))
    }

    /// Reads [`DB_ENV_VAR`]: `memory`, a file path, or unset for the default location.
    pub fn from_env() -> Self {
        Self::from_value(env::var(DB_ENV_VAR).ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("memory") => Self::in_memory(),
            Some(path) if !path.is_empty() => Self::at(path),
            _ => Self::default_location(),
        }
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn with_statement_cache_capacity(mut self, capacity: usize) -> Self {
        self.statement_cache_capacity = capacity;
        self
    }

    pub fn without_wal(mut self) -> Self {
        self.wal = false;
        self
    }
}
