/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("invalid {record} record: {reason}")]
    InvalidRecord { record: String, reason: String },

    #[error("{record} not found: {id}")]
    NotFound { record: String, id: String },
}
