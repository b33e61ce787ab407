//! # strata-storage
//!
//! SQLite implementation of [`IGraphStore`](strata_core::traits::IGraphStore):
//! one write connection, a WAL read pool, versioned migrations, FTS5 lexical
//! search, and brute-force cosine search over embedding BLOBs.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use strata_core::errors::{StorageError, StrataError};

/// Wrap a SQLite failure message in the workspace error type.
pub(crate) fn to_storage_err(message: String) -> StrataError {
    StorageError::SqliteError { message }.into()
}
