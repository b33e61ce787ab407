//! Dense retrieval: cosine similarity between the query and chunk embeddings.

use std::sync::Arc;

use strata_core::models::{QueryContext, SearchResult, StrategyTag};
use strata_core::traits::{IGraphStore, IStrategyExecutor};
use strata_core::StrataResult;

use super::{finish, require_embedding};

pub struct VectorExecutor {
    store: Arc<dyn IGraphStore>,
}

impl VectorExecutor {
    pub fn new(store: Arc<dyn IGraphStore>) -> Self {
        Self { store }
    }
}

impl IStrategyExecutor for VectorExecutor {
    fn tag(&self) -> StrategyTag {
        StrategyTag::Vector
    }

    fn search(&self, query: &QueryContext, top_k: usize) -> StrataResult<Vec<SearchResult>> {
        let embedding = require_embedding(query, self.tag())?;
        let results = self
            .store
            .search_chunks_by_vector(embedding, top_k)?
            .into_iter()
            .map(|(chunk, similarity)| SearchResult::new(chunk, similarity, StrategyTag::Vector))
            .collect();
        Ok(finish(results, top_k))
    }
}
