use serde::{Deserialize, Serialize};

use super::defaults;

/// How the hybrid strategy combines its lexical and vector lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HybridFusionMode {
    /// Reciprocal rank fusion with constant `rrf_k`.
    Rrf,
    /// Max-normalized weighted sum using `lexical_weight` / `vector_weight`.
    Weighted,
}

impl Default for HybridFusionMode {
    fn default() -> Self {
        match defaults::DEFAULT_HYBRID_FUSION {
            "weighted" => Self::Weighted,
            _ => Self::Rrf,
        }
    }
}

/// Retrieval subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Result count used when a request does not specify one.
    pub default_top_k: usize,
    /// Largest accepted `top_k`.
    pub max_top_k: usize,
    /// Upper bound on fused candidates handed to the reranker.
    pub max_candidates: usize,
    /// Over-fetch factor applied by executors that merge several lists.
    pub candidate_multiplier: usize,
    /// Per-query budget enforced at the fan-out barrier.
    pub query_timeout_ms: u64,
    /// Queries shorter than this (trimmed, in chars) go straight to vector search.
    pub min_query_chars: usize,
    /// Fusion mode for the hybrid strategy.
    pub hybrid_fusion: HybridFusionMode,
    /// RRF k-value for rank fusion.
    pub rrf_k: u32,
    /// Lexical weight for weighted fusion.
    pub lexical_weight: f64,
    /// Vector weight for weighted fusion.
    pub vector_weight: f64,
    /// Relationship hops for entity expansion and path search.
    pub max_hops: usize,
    /// Minimum cosine similarity for embedding-based entity resolution.
    pub entity_match_threshold: f64,
    /// Boost per additional query entity a chunk connects to.
    pub co_occurrence_boost: f64,
    /// Score multiplier applied per expansion hop.
    pub hop_decay: f64,
    /// Level where community descent starts. `None` means the top level.
    pub community_start_level: Option<u32>,
    /// Communities kept at each level of the descent.
    pub community_beam_width: usize,
    /// Maximum levels descended below the start level.
    pub max_descent_depth: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_top_k: defaults::DEFAULT_TOP_K,
            max_top_k: defaults::DEFAULT_MAX_TOP_K,
            max_candidates: defaults::DEFAULT_MAX_CANDIDATES,
            candidate_multiplier: defaults::DEFAULT_CANDIDATE_MULTIPLIER,
            query_timeout_ms: defaults::DEFAULT_QUERY_TIMEOUT_MS,
            min_query_chars: defaults::DEFAULT_MIN_QUERY_CHARS,
            hybrid_fusion: HybridFusionMode::default(),
            rrf_k: defaults::DEFAULT_RRF_K,
            lexical_weight: defaults::DEFAULT_LEXICAL_WEIGHT,
            vector_weight: defaults::DEFAULT_VECTOR_WEIGHT,
            max_hops: defaults::DEFAULT_MAX_HOPS,
            entity_match_threshold: defaults::DEFAULT_ENTITY_MATCH_THRESHOLD,
            co_occurrence_boost: defaults::DEFAULT_CO_OCCURRENCE_BOOST,
            hop_decay: defaults::DEFAULT_HOP_DECAY,
            community_start_level: None,
            community_beam_width: defaults::DEFAULT_COMMUNITY_BEAM_WIDTH,
            max_descent_depth: defaults::DEFAULT_MAX_DESCENT_DEPTH,
        }
    }
}
