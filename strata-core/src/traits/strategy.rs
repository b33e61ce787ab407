use crate::errors::StrataResult;
use crate::models::{QueryContext, SearchResult, StrategyTag};

/// One independent retrieval algorithm.
///
/// Implementations are read-only: they may query the graph store but never write to it.
pub trait IStrategyExecutor: Send + Sync {
    fn tag(&self) -> StrategyTag;

    /// Up to `top_k` results, best first.
    fn search(&self, query: &QueryContext, top_k: usize) -> StrataResult<Vec<SearchResult>>;
}
