use serde::{Deserialize, Serialize};

use super::{Chunk, StrategyTag};

/// One hop of a reasoning path: `from --relation--> to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathHop {
    pub from_id: String,
    pub from_name: String,
    pub relation: String,
    pub to_id: String,
    pub to_name: String,
    pub weight: f64,
}

/// A retrieved chunk with its score and provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f64,
    /// Strategy that produced the kept score.
    pub strategy: StrategyTag,
    /// Every strategy that returned this chunk, sorted.
    pub contributing_strategies: Vec<StrategyTag>,
    /// Graph hops that justified the retrieval, when a traversal produced it.
    pub reasoning_path: Option<Vec<PathHop>>,
    /// Score assigned by the reranker, after any diversity discount.
    pub rerank_score: Option<f64>,
}

impl SearchResult {
    pub fn new(chunk: Chunk, score: f64, strategy: StrategyTag) -> Self {
        Self {
            chunk,
            score,
            strategy,
            contributing_strategies: vec![strategy],
            reasoning_path: None,
            rerank_score: None,
        }
    }

    pub fn with_path(mut self, path: Vec<PathHop>) -> Self {
        self.reasoning_path = Some(path);
        self
    }

    pub fn chunk_id(&self) -> &str {
        &self.chunk.id
    }

    /// Final ordering score: the rerank score when present.
    pub fn final_score(&self) -> f64 {
        self.rerank_score.unwrap_or(self.score)
    }
}
