//! Lexical + dense retrieval fused into one ranking.
//!
//! Both lists are over-fetched by `candidate_multiplier`. In [`HybridFusionMode::Rrf`]
//! mode (the default) positions are fused with `1/(k + rank)`; in
//! [`HybridFusionMode::Weighted`] mode each list is max-normalized and summed
//! with the configured weights.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use strata_core::config::{HybridFusionMode, RetrievalConfig};
use strata_core::models::{Chunk, QueryContext, SearchResult, StrategyTag};
use strata_core::traits::{IGraphStore, IStrategyExecutor};
use strata_core::StrataResult;

use crate::fusion::{rrf, weighted};

pub struct HybridExecutor {
    store: Arc<dyn IGraphStore>,
    mode: HybridFusionMode,
    rrf_k: u32,
    lexical_weight: f64,
    vector_weight: f64,
    candidate_multiplier: usize,
}

impl HybridExecutor {
    pub fn from_config(store: Arc<dyn IGraphStore>, config: &RetrievalConfig) -> Self {
        Self {
            store,
            mode: config.hybrid_fusion,
            rrf_k: config.rrf_k,
            lexical_weight: config.lexical_weight,
            vector_weight: config.vector_weight,
            candidate_multiplier: config.candidate_multiplier.max(1),
        }
    }

    pub fn mode(&self) -> HybridFusionMode {
        self.mode
    }

    /// Fuse a lexical and a vector list of `(chunk_id, score)`. Inputs need not
    /// be sorted. Output is best first, ties by chunk id.
    pub fn fuse_lists(&self, lexical: &[(String, f64)], vector: &[(String, f64)]) -> Vec<(String, f64)> {
        match self.mode {
            HybridFusionMode::Rrf => {
                let lexical = best_first(lexical);
                let vector = best_first(vector);
                let lists = [
                    rrf::ranks(lexical.iter().map(|(id, _)| id.as_str())),
                    rrf::ranks(vector.iter().map(|(id, _)| id.as_str())),
                ];
                rrf::fuse(&lists, self.rrf_k)
            }
            HybridFusionMode::Weighted => {
                weighted::fuse(&[(lexical, self.lexical_weight), (vector, self.vector_weight)])
            }
        }
    }
}

fn best_first(list: &[(String, f64)]) -> Vec<(String, f64)> {
    let mut sorted = list.to_vec();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0)));
    sorted
}

impl IStrategyExecutor for HybridExecutor {
    fn tag(&self) -> StrategyTag {
        StrategyTag::Hybrid
    }

    fn search(&self, query: &QueryContext, top_k: usize) -> StrataResult<Vec<SearchResult>> {
        let fetch = top_k.saturating_mul(self.candidate_multiplier);
        let mut chunks: HashMap<String, Chunk> = HashMap::new();

        let mut collect = |hits: Vec<(Chunk, f64)>| -> Vec<(String, f64)> {
            hits.into_iter()
                .map(|(chunk, score)| {
                    let id = chunk.id.clone();
                    chunks.entry(id.clone()).or_insert(chunk);
                    (id, score)
                })
                .collect()
        };

        let lexical = collect(self.store.search_chunks_lexical(&query.text, fetch)?);
        let vector = match query.embedding.as_deref() {
            Some(embedding) => collect(self.store.search_chunks_by_vector(embedding, fetch)?),
            None => Vec::new(),
        };
        debug!(lexical = lexical.len(), vector = vector.len(), mode = ?self.mode, "hybrid lists fetched");

        Ok(self
            .fuse_lists(&lexical, &vector)
            .into_iter()
            .filter_map(|(id, score)| {
                chunks
                    .remove(&id)
                    .map(|chunk| SearchResult::new(chunk, score, StrategyTag::Hybrid))
            })
            .take(top_k)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor(mode: HybridFusionMode) -> HybridExecutor {
        let config = RetrievalConfig { hybrid_fusion: mode, ..RetrievalConfig::default() };
        let store = strata_storage::StorageEngine::open_in_memory().unwrap();
        HybridExecutor::from_config(Arc::new(store), &config)
    }

    fn list(items: &[(&str, f64)]) -> Vec<(String, f64)> {
        items.iter().map(|(id, s)| (id.to_string(), *s)).collect()
    }

    #[test]
    fn rrf_mode_orders_by_rank_formula() {
        let lexical = list(&[("x", 9.0), ("y", 8.0), ("a", 7.0), ("b", 6.0), ("c", 5.0)]);
        let vector = list(&[("d", 0.99), ("y", 0.95), ("e", 0.9), ("f", 0.85), ("x", 0.8)]);
        let fused = executor(HybridFusionMode::Rrf).fuse_lists(&lexical, &vector);
        assert_eq!(fused[0].0, "y");
        assert_eq!(fused[1].0, "x");
        assert!((fused[0].1 - 2.0 / 62.0).abs() < 1e-12);
        assert!((fused[1].1 - (1.0 / 61.0 + 1.0 / 65.0)).abs() < 1e-12);
    }

    #[test]
    fn weighted_mode_uses_configured_weights() {
        let lexical = list(&[("a", 4.0), ("b", 2.0)]);
        let vector = list(&[("b", 0.8)]);
        let fused = executor(HybridFusionMode::Weighted).fuse_lists(&lexical, &vector);
        assert_eq!(fused[0].0, "b");
        assert!((fused[0].1 - (0.3 * 0.5 + 0.7)).abs() < 1e-12);
        assert!((fused[1].1 - 0.3).abs() < 1e-12);
    }
}
