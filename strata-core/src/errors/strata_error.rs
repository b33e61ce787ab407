use super::{EmbeddingError, HierarchyError, ProviderError, RetrievalError, StorageError};

/// Top-level error type for the Strata system.
#[derive(Debug, thiserror::Error)]
pub enum StrataError {
    #[error("entity not found: {id}")]
    EntityNotFound { id: String },

    #[error("community not found: {id}")]
    CommunityNotFound { id: String },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("hierarchy error: {0}")]
    HierarchyError(#[from] HierarchyError),

    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("provider error: {0}")]
    ProviderError(#[from] ProviderError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),
}

/// Convenience alias used across the workspace.
pub type StrataResult<T> = Result<T, StrataError>;
