//! Transactional key-value backend.
//!
//! The graph core only needs ordered string keys mapped to byte values, read
//! transactions ([`KvBackend::view`]) and read-write transactions
//! ([`KvBackend::update`]). Both are served by a single SQLite table. The
//! connection sits behind a mutex, which makes every transaction serializable
//! with respect to every other; transactions must not be nested.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};

use crate::{config::BackendConfig, errors::KvGraphError, schema::ensure_schema};

/// Read access shared by read-only and read-write transactions.
pub trait KvRead {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvGraphError>;
    fn contains(&self, key: &str) -> Result<bool, KvGraphError>;
    /// Keys starting with `prefix`, in ascending order.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, KvGraphError>;
    /// Entries whose key starts with `prefix`, in ascending key order.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KvGraphError>;
    fn count_prefix(&self, prefix: &str) -> Result<usize, KvGraphError>;
    fn has_prefix(&self, prefix: &str) -> Result<bool, KvGraphError>;
}

pub struct ReadTx<'conn> {
    tx: Transaction<'conn>,
}

pub struct WriteTx<'conn> {
    tx: Transaction<'conn>,
}

impl WriteTx<'_> {
    pub fn set(&mut self, key: &str, value: &[u8]) -> Result<(), KvGraphError> {
        self.tx
            .prepare_cached(
                "INSERT INTO kv(key, value) VALUES(?1, ?2) \
                 ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            )
            .and_then(|mut stmt| stmt.execute(params![key, value]))
            .map_err(|e| KvGraphError::backend("set", key, e))?;
        Ok(())
    }

    /// Removes `key`, returning whether it was present.
    pub fn delete(&mut self, key: &str) -> Result<bool, KvGraphError> {
        let affected = self
            .tx
            .prepare_cached("DELETE FROM kv WHERE key=?1")
            .and_then(|mut stmt| stmt.execute(params![key]))
            .map_err(|e| KvGraphError::backend("delete", key, e))?;
        Ok(affected > 0)
    }
}

macro_rules! impl_kv_read {
    ($tx:ident) => {
        impl KvRead for $tx<'_> {
            fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvGraphError> {
                ops::get(&self.tx, key)
            }

            fn contains(&self, key: &str) -> Result<bool, KvGraphError> {
                ops::contains(&self.tx, key)
            }

            fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, KvGraphError> {
                ops::keys_with_prefix(&self.tx, prefix)
            }

            fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KvGraphError> {
                ops::scan_prefix(&self.tx, prefix)
            }

            fn count_prefix(&self, prefix: &str) -> Result<usize, KvGraphError> {
                ops::count_prefix(&self.tx, prefix)
            }

            fn has_prefix(&self, prefix: &str) -> Result<bool, KvGraphError> {
                ops::has_prefix(&self.tx, prefix)
            }
        }
    };
}

impl_kv_read!(ReadTx);
impl_kv_read!(WriteTx);

pub struct KvBackend {
    conn: Mutex<Connection>,
    location: Option<PathBuf>,
}

impl fmt::Debug for KvBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvBackend")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl KvBackend {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KvGraphError> {
        Self::open_with(&BackendConfig::at(path))
    }

    pub fn open_in_memory() -> Result<Self, KvGraphError> {
        Self::open_with(&BackendConfig::in_memory())
    }

    pub fn open_with(config: &BackendConfig) -> Result<Self, KvGraphError> {
        let conn = match &config.path {
            Some(path) => {
                if config.create_dirs {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        fs::create_dir_all(parent).map_err(|e| {
                            KvGraphError::connection(format!(
                                "cannot create directory {}: {e}",
                                parent.display()
                            ))
                        })?;
                    }
                }
                Connection::open(path)
            }
            None => Connection::open_in_memory(),
        }
        .map_err(|e| KvGraphError::connection(e.to_string()))?;
        conn.busy_timeout(config.busy_timeout)
            .map_err(|e| KvGraphError::connection(e.to_string()))?;
        conn.set_prepared_statement_cache_capacity(config.statement_cache_capacity);
        if config.path.is_some() && config.wal {
            let _mode: String = conn
                .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
                .map_err(|e| KvGraphError::connection(e.to_string()))?;
        }
        ensure_schema(&conn)?;
        tracing::debug!(location = ?config.path, "backend.open");
        Ok(Self {
            conn: Mutex::new(conn),
            location: config.path.clone(),
        })
    }

    /// File backing this store, `None` when in memory.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Runs `f` inside a read-only transaction.
    pub fn view<R, F>(&self, f: F) -> Result<R, KvGraphError>
    where
        F: FnOnce(&ReadTx<'_>) -> Result<R, KvGraphError>,
    {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(|e| KvGraphError::backend("begin_read", "", e))?;
        let read = ReadTx { tx };
        f(&read)
    }

    /// Runs `f` inside a read-write transaction, committing when it returns `Ok`.
    /// Any error rolls every write of `f` back.
    pub fn update<R, F>(&self, f: F) -> Result<R, KvGraphError>
    where
        F: FnOnce(&mut WriteTx<'_>) -> Result<R, KvGraphError>,
    {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| KvGraphError::backend("begin_write", "", e))?;
        let mut write = WriteTx { tx };
        let value = f(&mut write)?;
        write
            .tx
            .commit()
            .map_err(|e| KvGraphError::backend("commit", "", e))?;
        Ok(value)
    }
}

mod ops {
    use super::*;

    pub(super) fn get(conn: &Connection, key: &str) -> Result<Option<Vec<u8>>, KvGraphError> {
        conn.prepare_cached("SELECT value FROM kv WHERE key=?1")
            .and_then(|mut stmt| stmt.query_row(params![key], |row| row.get(0)).optional())
            .map_err(|e| KvGraphError::backend("get", key, e))
    }

    pub(super) fn contains(conn: &Connection, key: &str) -> Result<bool, KvGraphError> {
        conn.prepare_cached("SELECT 1 FROM kv WHERE key=?1")
            .and_then(|mut stmt| stmt.exists(params![key]))
            .map_err(|e| KvGraphError::backend("contains", key, e))
    }

    pub(super) fn keys_with_prefix(
        conn: &Connection,
        prefix: &str,
    ) -> Result<Vec<String>, KvGraphError> {
        let map_err = |e: rusqlite::Error| KvGraphError::backend("scan", prefix, e);
        let mut keys = Vec::new();
        match upper_bound(prefix) {
            Some(upper) => {
                let mut stmt = conn
                    .prepare_cached("SELECT key FROM kv WHERE key >= ?1 AND key < ?2 ORDER BY key")
                    .map_err(map_err)?;
                let rows = stmt
                    .query_map(params![prefix, upper], |row| row.get(0))
                    .map_err(map_err)?;
                for key in rows {
                    keys.push(key.map_err(map_err)?);
                }
            }
            None => {
                let mut stmt = conn
                    .prepare_cached("SELECT key FROM kv WHERE key >= ?1 ORDER BY key")
                    .map_err(map_err)?;
                let rows = stmt
                    .query_map(params![prefix], |row| row.get(0))
                    .map_err(map_err)?;
                for key in rows {
                    keys.push(key.map_err(map_err)?);
                }
            }
        }
        Ok(keys)
    }

    pub(super) fn scan_prefix(
        conn: &Connection,
        prefix: &str,
    ) -> Result<Vec<(String, Vec<u8>)>, KvGraphError> {
        let map_err = |e: rusqlite::Error| KvGraphError::backend("scan", prefix, e);
        let mut entries = Vec::new();
        match upper_bound(prefix) {
            Some(upper) => {
                let mut stmt = conn
                    .prepare_cached(
                        "SELECT key, value FROM kv WHERE key >= ?1 AND key < ?2 ORDER BY key",
                    )
                    .map_err(map_err)?;
                let rows = stmt
                    .query_map(params![prefix, upper], |row| Ok((row.get(0)?, row.get(1)?)))
                    .map_err(map_err)?;
                for entry in rows {
                    entries.push(entry.map_err(map_err)?);
                }
            }
            None => {
                let mut stmt = conn
                    .prepare_cached("SELECT key, value FROM kv WHERE key >= ?1 ORDER BY key")
                    .map_err(map_err)?;
                let rows = stmt
                    .query_map(params![prefix], |row| Ok((row.get(0)?, row.get(1)?)))
                    .map_err(map_err)?;
                for entry in rows {
                    entries.push(entry.map_err(map_err)?);
                }
            }
        }
        Ok(entries)
    }

    pub(super) fn count_prefix(conn: &Connection, prefix: &str) -> Result<usize, KvGraphError> {
        let count: i64 = match upper_bound(prefix) {
            Some(upper) => conn
                .prepare_cached("SELECT COUNT(*) FROM kv WHERE key >= ?1 AND key < ?2")
                .and_then(|mut stmt| stmt.query_row(params![prefix, upper], |row| row.get(0))),
            None => conn
                .prepare_cached("SELECT COUNT(*) FROM kv WHERE key >= ?1")
                .and_then(|mut stmt| stmt.query_row(params![prefix], |row| row.get(0))),
        }
        .map_err(|e| KvGraphError::backend("count", prefix, e))?;
        Ok(count as usize)
    }

    pub(super) fn has_prefix(conn: &Connection, prefix: &str) -> Result<bool, KvGraphError> {
        match upper_bound(prefix) {
            Some(upper) => conn
                .prepare_cached("SELECT 1 FROM kv WHERE key >= ?1 AND key < ?2 LIMIT 1")
                .and_then(|mut stmt| stmt.exists(params![prefix, upper])),
            None => conn
                .prepare_cached("SELECT 1 FROM kv WHERE key >= ?1 LIMIT 1")
                .and_then(|mut stmt| stmt.exists(params![prefix])),
        }
        .map_err(|e| KvGraphError::backend("has_prefix", prefix, e))
    }

    /// Smallest string greater than every string starting with `prefix`.
    /// Keys compare as UTF-8 bytes, which orders them by code point.
    pub(super) fn upper_bound(prefix: &str) -> Option<String> {
        let mut chars: Vec<char> = prefix.chars().collect();
        while let Some(last) = chars.pop() {
            if let Some(next) = next_char(last) {
                chars.push(next);
                return Some(chars.into_iter().collect());
            }
        }
        None
    }

    fn next_char(c: char) -> Option<char> {
        let mut code = c as u32 + 1;
        if (0xD800..=0xDFFF).contains(&code) {
            code = 0xE000;
        }
        char::from_u32(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_bound_increments_last_char() {
        assert_eq!(ops::upper_bound("ab"), Some("ac".to_string()));
        assert_eq!(ops::upper_bound(""), None);
        assert_eq!(
            ops::upper_bound(&format!("a{}", char::MAX)),
            Some("b".to_string())
        );
    }

    #[test]
    fn update_commits_and_view_reads() {
        let backend = KvBackend::open_in_memory().unwrap();
        backend
            .update(|tx| {
                tx.set("va:1", b"{}")?;
                tx.set("va:2", b"{}")?;
                tx.set("vb:1", b"{}")
            })
            .unwrap();
        let keys = backend.view(|tx| tx.keys_with_prefix("va")).unwrap();
        assert_eq!(keys, vec!["va:1".to_string(), "va:2".to_string()]);
        assert_eq!(backend.view(|tx| tx.count_prefix("v")).unwrap(), 3);
        assert!(backend.view(|tx| tx.has_prefix("vb")).unwrap());
        assert!(!backend.view(|tx| tx.has_prefix("vc")).unwrap());
    }

    #[test]
    fn failed_update_rolls_back() {
        let backend = KvBackend::open_in_memory().unwrap();
        let result: Result<(), KvGraphError> = backend.update(|tx| {
            tx.set("k", b"1")?;
            Err(KvGraphError::invalid_input("abort"))
        });
        assert!(result.is_err());
        assert_eq!(backend.view(|tx| tx.get("k")).unwrap(), None);
    }

    #[test]
    fn delete_reports_presence() {
        let backend = KvBackend::open_in_memory().unwrap();
        backend.update(|tx| tx.set("k", b"1")).unwrap();
        assert!(backend.update(|tx| tx.delete("k")).unwrap());
        assert!(!backend.update(|tx| tx.delete("k")).unwrap());
    }
}
