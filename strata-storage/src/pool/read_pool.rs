//! Read-only connections for a file-backed store. In WAL mode they never wait
//! on the writer, only on each other.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use rusqlite::{Connection, OpenFlags};

use strata_core::config::StorageConfig;
use strata_core::errors::StrataResult;

use super::pragmas::apply_read_pragmas;
use crate::to_storage_err;

/// Upper bound on pooled readers.
const MAX_READERS: usize = 8;

pub struct ReadPool {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    pub fn open(path: &Path, config: &StorageConfig) -> StrataResult<Self> {
        let size = config.read_pool_size.clamp(1, MAX_READERS);
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connections = (0..size)
            .map(|_| {
                let conn = Connection::open_with_flags(path, flags).map_err(|e| to_storage_err(e.to_string()))?;
                apply_read_pragmas(&conn, config)?;
                Ok(Mutex::new(conn))
            })
            .collect::<StrataResult<Vec<_>>>()?;
        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// Run `f` on the first idle connection, starting from a rotating offset.
    /// Blocks on the starting connection only when every reader is busy.
    pub fn with_conn<F, T>(&self, f: F) -> StrataResult<T>
    where
        F: FnOnce(&Connection) -> StrataResult<T>,
    {
        let start = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        let guard = self.idle_from(start).unwrap_or_else(|| {
            self.connections[start].lock().unwrap_or_else(PoisonError::into_inner)
        });
        f(&guard)
    }

    fn idle_from(&self, start: usize) -> Option<MutexGuard<'_, Connection>> {
        let n = self.connections.len();
        (0..n).find_map(|offset| match self.connections[(start + offset) % n].try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        })
    }

    pub fn size(&self) -> usize {
        self.connections.len()
    }
}
