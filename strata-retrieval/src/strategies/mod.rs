//! The five retrieval executors and the registry wiring them to their tags.

pub mod community;
pub mod entity_aware;
pub mod graph_traversal;
pub mod hybrid;
pub mod vector;

pub use community::CommunityExecutor;
pub use entity_aware::{co_occurrence_score, EntityAwareExecutor};
pub use graph_traversal::GraphTraversalExecutor;
pub use hybrid::HybridExecutor;
pub use vector::VectorExecutor;

use std::sync::Arc;

use strata_community::HierarchyHandle;
use strata_core::config::RetrievalConfig;
use strata_core::errors::RetrievalError;
use strata_core::models::{QueryContext, SearchResult, StrategyTag};
use strata_core::traits::IGraphStore;
use strata_core::StrataResult;

use crate::fusion::by_score_then_id;
use crate::selection::StrategyRegistry;

/// A registry with every built-in executor.
pub fn default_registry(
    store: Arc<dyn IGraphStore>,
    hierarchy: HierarchyHandle,
    config: &RetrievalConfig,
) -> StrategyRegistry {
    StrategyRegistry::new()
        .with(Arc::new(VectorExecutor::new(store.clone())))
        .with(Arc::new(HybridExecutor::from_config(store.clone(), config)))
        .with(Arc::new(EntityAwareExecutor::from_config(store.clone(), config)))
        .with(Arc::new(GraphTraversalExecutor::new(store.clone(), config.max_hops)))
        .with(Arc::new(CommunityExecutor::from_config(store, hierarchy, config)))
}

/// The query embedding, or an error naming the strategy that needed it.
pub(crate) fn require_embedding(query: &QueryContext, tag: StrategyTag) -> StrataResult<&[f32]> {
    query.embedding.as_deref().ok_or_else(|| {
        RetrievalError::EmbeddingUnavailable {
            strategy: tag.to_string(),
        }
        .into()
    })
}

/// Sort best first, ties by chunk id, and keep `top_k`.
pub(crate) fn finish(mut results: Vec<SearchResult>, top_k: usize) -> Vec<SearchResult> {
    results.sort_by(by_score_then_id);
    results.truncate(top_k);
    results
}
