use crate::errors::StrataResult;
use crate::models::Chunk;

/// Pairwise (query, chunk) relevance model, e.g. a cross-encoder.
pub trait IRelevanceScorer: Send + Sync {
    /// Higher is more relevant. The scale is model-defined.
    fn score(&self, query: &str, chunk: &Chunk) -> StrataResult<f64>;

    fn name(&self) -> &str;
}
