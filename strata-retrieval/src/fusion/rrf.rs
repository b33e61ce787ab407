//! Reciprocal Rank Fusion: score = Σ 1/(k + rank_i), ranks 1-based.
//!
//! Combines ranked lists without normalizing scores across retrieval methods.

use std::collections::HashMap;

/// Fuse ranked lists of `(id, rank)` pairs. Output is sorted by fused score
/// descending, ties broken by id.
pub fn fuse(ranked_lists: &[Vec<(String, usize)>], k: u32) -> Vec<(String, f64)> {
    let mut scores: HashMap<String, f64> = HashMap::new();
    for list in ranked_lists {
        for (id, rank) in list {
            *scores.entry(id.clone()).or_default() += 1.0 / (k as f64 + *rank as f64);
        }
    }
    super::sorted(scores)
}

/// Turn a best-first list into `(id, rank)` pairs with 1-based ranks.
pub fn ranks<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    ids.into_iter().enumerate().map(|(i, id)| (id.to_string(), i + 1)).collect()
}
