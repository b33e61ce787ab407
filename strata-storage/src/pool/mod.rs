//! Connections behind the graph store: one writer, plus a read pool when the
//! database lives in a file.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::Path;

use rusqlite::{Connection, Transaction};

use strata_core::config::StorageConfig;
use strata_core::errors::StrataResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// Routes each call to the right connection.
///
/// A second in-memory connection would open a separate, empty database, so an
/// in-memory pool has no readers and serves reads from the writer.
pub struct ConnectionPool {
    writer: WriteConnection,
    readers: Option<ReadPool>,
}

impl ConnectionPool {
    pub fn open(path: &Path, config: &StorageConfig) -> StrataResult<Self> {
        // The writer creates the file and sets WAL before any reader attaches.
        let writer = WriteConnection::open(path, config)?;
        let readers = ReadPool::open(path, config)?;
        Ok(Self {
            writer,
            readers: Some(readers),
        })
    }

    pub fn open_in_memory(config: &StorageConfig) -> StrataResult<Self> {
        Ok(Self {
            writer: WriteConnection::open_in_memory(config)?,
            readers: None,
        })
    }

    /// Run a read-only closure. Concurrent executors land on different pooled
    /// connections when the store is file-backed.
    pub fn read<F, T>(&self, f: F) -> StrataResult<T>
    where
        F: FnOnce(&Connection) -> StrataResult<T>,
    {
        match &self.readers {
            Some(readers) => readers.with_conn(f),
            None => self.writer.with_conn(f),
        }
    }

    pub fn write<F, T>(&self, f: F) -> StrataResult<T>
    where
        F: FnOnce(&Connection) -> StrataResult<T>,
    {
        self.writer.with_conn(f)
    }

    /// Run `f` in one write transaction; any error rolls the whole thing back.
    pub fn transaction<F, T>(&self, f: F) -> StrataResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> StrataResult<T>,
    {
        self.writer.with_transaction(f)
    }

    /// Pooled read connections; 0 for an in-memory store.
    pub fn reader_count(&self) -> usize {
        self.readers.as_ref().map_or(0, ReadPool::size)
    }
}
