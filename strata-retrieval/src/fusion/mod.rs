//! Score fusion: per-strategy list fusion for the hybrid executor, and the
//! cross-strategy [`ResultFuser`].

pub mod rrf;
pub mod weighted;

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use strata_core::models::SearchResult;

/// Sort `(id, score)` pairs by score descending, ties by id.
pub(crate) fn sorted(scores: HashMap<String, f64>) -> Vec<(String, f64)> {
    let mut out: Vec<(String, f64)> = scores.into_iter().collect();
    out.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Best-first ordering for results: score descending, then chunk id.
pub fn by_score_then_id(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.chunk_id().cmp(b.chunk_id()))
}

/// Merges the outputs of every executor for one query.
#[derive(Debug, Clone)]
pub struct ResultFuser {
    max_candidates: usize,
}

impl ResultFuser {
    pub fn new(max_candidates: usize) -> Self {
        Self { max_candidates: max_candidates.max(1) }
    }

    /// Deduplicate by chunk id, keeping the highest-scoring instance annotated
    /// with every contributing strategy. At most `max_candidates` survive; the
    /// lowest scores are dropped first.
    pub fn fuse(&self, results: Vec<SearchResult>) -> Vec<SearchResult> {
        let input = results.len();
        let mut order: Vec<String> = Vec::new();
        let mut merged: HashMap<String, SearchResult> = HashMap::new();

        for mut result in results {
            if result.contributing_strategies.is_empty() {
                result.contributing_strategies.push(result.strategy);
            }
            match merged.get_mut(result.chunk_id()) {
                None => {
                    order.push(result.chunk_id().to_string());
                    merged.insert(result.chunk_id().to_string(), result);
                }
                Some(kept) => {
                    let mut strategies = std::mem::take(&mut kept.contributing_strategies);
                    strategies.extend(result.contributing_strategies.iter().copied());
                    strategies.sort();
                    strategies.dedup();

                    if result.score > kept.score {
                        let fallback_path = kept.reasoning_path.take();
                        *kept = result;
                        if kept.reasoning_path.as_ref().map_or(true, Vec::is_empty) {
                            kept.reasoning_path = fallback_path;
                        }
                    } else if kept.reasoning_path.as_ref().map_or(true, Vec::is_empty) {
                        kept.reasoning_path = result.reasoning_path.filter(|p| !p.is_empty());
                    }
                    kept.contributing_strategies = strategies;
                }
            }
        }

        let mut fused: Vec<SearchResult> = order.into_iter().filter_map(|id| merged.remove(&id)).collect();
        if fused.len() > self.max_candidates {
            fused.sort_by(by_score_then_id);
            fused.truncate(self.max_candidates);
        }
        debug!(input, fused = fused.len(), "results fused");
        fused
    }
}
