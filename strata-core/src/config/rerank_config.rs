use serde::{Deserialize, Serialize};

use super::defaults;

/// Reranking and diversity selection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// Results kept after reranking (clamped to the request's top_k).
    pub top_n: usize,
    /// Apply the near-duplicate penalty during selection.
    pub diversity_enabled: bool,
    /// Similarity above which a candidate counts as a near duplicate.
    pub similarity_threshold: f64,
    /// Fraction of a near duplicate's score removed.
    pub discount_factor: f64,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            top_n: defaults::DEFAULT_RERANK_TOP_N,
            diversity_enabled: defaults::DEFAULT_DIVERSITY_ENABLED,
            similarity_threshold: defaults::DEFAULT_DIVERSITY_THRESHOLD,
            discount_factor: defaults::DEFAULT_DIVERSITY_DISCOUNT,
        }
    }
}
