//! Single write connection. Writes are serialized behind one mutex.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use strata_core::config::StorageConfig;
use strata_core::errors::StrataResult;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// The only connection allowed to write.
///
/// A blocking mutex: callers reach it from rayon workers and `spawn_blocking`
/// tasks as well as plain threads.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open a new write connection to the given database path.
    pub fn open(path: &Path, config: &StorageConfig) -> StrataResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory(config: &StorageConfig) -> StrataResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the write lock and execute a closure with the connection.
    pub fn with_conn<F, T>(&self, f: F) -> StrataResult<T>
    where
        F: FnOnce(&Connection) -> StrataResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("write lock poisoned: {e}")))?;
        f(&guard)
    }

    /// Run `f` inside a transaction; commits on `Ok`, rolls back on `Err`.
    pub fn with_transaction<F, T>(&self, f: F) -> StrataResult<T>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> StrataResult<T>,
    {
        let mut guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("write lock poisoned: {e}")))?;
        let tx = guard
            .transaction()
            .map_err(|e| to_storage_err(e.to_string()))?;
        let value = f(&tx)?;
        tx.commit().map_err(|e| to_storage_err(e.to_string()))?;
        Ok(value)
    }
}
