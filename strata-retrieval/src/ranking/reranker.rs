//! Cross-encoder rescoring plus MMR-style near-duplicate suppression.
//!
//! Selection is greedy: each round takes the remaining candidate with the
//! highest adjusted score, where a candidate too similar to anything already
//! picked loses `discount · |score|`. The absolute value keeps the penalty
//! pointing down for negative logits.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, warn};

use strata_core::config::RerankConfig;
use strata_core::models::SearchResult;
use strata_core::similarity::{cosine_similarity, word_jaccard};
use strata_core::traits::IRelevanceScorer;

pub struct Reranker {
    config: RerankConfig,
    scorer: Option<Arc<dyn IRelevanceScorer>>,
}

impl Reranker {
    pub fn new(config: RerankConfig, scorer: Option<Arc<dyn IRelevanceScorer>>) -> Self {
        Self { config, scorer }
    }

    /// At most `min(top_n, top_k)` results, no duplicate chunk ids, ordered by
    /// the discounted score. Candidates the scorer fails on are dropped.
    pub fn rerank(&self, query: &str, candidates: Vec<SearchResult>, top_k: usize) -> Vec<SearchResult> {
        let limit = self.config.top_n.min(top_k);
        if limit == 0 || candidates.is_empty() {
            return Vec::new();
        }

        let mut pool = dedup(self.score(query, candidates));
        let mut selected: Vec<SearchResult> = Vec::with_capacity(limit.min(pool.len()));

        while selected.len() < limit && !pool.is_empty() {
            let mut best: Option<(usize, f64)> = None;
            for (i, (candidate, relevance)) in pool.iter().enumerate() {
                let adjusted = self.adjusted(candidate, *relevance, &selected);
                let better = match best {
                    None => true,
                    Some((j, best_score)) => match adjusted.partial_cmp(&best_score) {
                        Some(Ordering::Greater) => true,
                        Some(Ordering::Equal) => candidate.chunk_id() < pool[j].0.chunk_id(),
                        _ => false,
                    },
                };
                if better {
                    best = Some((i, adjusted));
                }
            }
            let Some((index, adjusted)) = best else { break };
            let (mut picked, _) = pool.swap_remove(index);
            picked.rerank_score = Some(adjusted);
            selected.push(picked);
        }

        debug!(selected = selected.len(), limit, "rerank complete");
        selected
    }

    /// Pair each candidate with its relevance. Without a scorer the fused
    /// score stands in.
    fn score(&self, query: &str, candidates: Vec<SearchResult>) -> Vec<(SearchResult, f64)> {
        let Some(scorer) = &self.scorer else {
            return candidates
                .into_iter()
                .map(|candidate| {
                    let relevance = candidate.score;
                    (candidate, relevance)
                })
                .collect();
        };
        candidates
            .into_iter()
            .filter_map(|candidate| match scorer.score(query, &candidate.chunk) {
                Ok(relevance) if relevance.is_finite() => Some((candidate, relevance)),
                Ok(relevance) => {
                    warn!(chunk_id = candidate.chunk_id(), relevance, "non-finite relevance, candidate excluded");
                    None
                }
                Err(e) => {
                    warn!(chunk_id = candidate.chunk_id(), scorer = scorer.name(), error = %e, "relevance scoring failed, candidate excluded");
                    None
                }
            })
            .collect()
    }

    fn adjusted(&self, candidate: &SearchResult, relevance: f64, selected: &[SearchResult]) -> f64 {
        if !self.config.diversity_enabled {
            return relevance;
        }
        let near_duplicate = selected
            .iter()
            .any(|s| similarity(candidate, s) > self.config.similarity_threshold);
        if near_duplicate {
            relevance - self.config.discount_factor * relevance.abs()
        } else {
            relevance
        }
    }
}

/// Cosine over embeddings when both chunks have one, word overlap otherwise.
fn similarity(a: &SearchResult, b: &SearchResult) -> f64 {
    match (&a.chunk.embedding, &b.chunk.embedding) {
        (Some(x), Some(y)) => cosine_similarity(x, y),
        _ => word_jaccard(&a.chunk.text, &b.chunk.text),
    }
}

/// Keep the first occurrence of each chunk id.
fn dedup(scored: Vec<(SearchResult, f64)>) -> Vec<(SearchResult, f64)> {
    let mut seen = std::collections::HashSet::new();
    scored
        .into_iter()
        .filter(|(c, _)| seen.insert(c.chunk_id().to_string()))
        .collect()
}
