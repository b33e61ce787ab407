/// Failures reported by the summary, classification, and relevance collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("summary provider {provider} failed: {reason}")]
    SummaryFailed { provider: String, reason: String },

    #[error("query classification failed: {reason}")]
    ClassificationFailed { reason: String },

    #[error("relevance scoring failed for chunk {chunk_id}: {reason}")]
    ScoringFailed { chunk_id: String, reason: String },
}
