/// Retrieval subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("no executor registered for strategy: {strategy}")]
    NoExecutor { strategy: String },

    #[error("strategy {strategy} failed: {reason}")]
    ExecutorFailed { strategy: String, reason: String },

    #[error("query embedding unavailable for strategy: {strategy}")]
    EmbeddingUnavailable { strategy: String },
}
