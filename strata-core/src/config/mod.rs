pub mod defaults;
mod hierarchy_config;
mod observability_config;
mod rerank_config;
mod retrieval_config;
mod storage_config;

pub use hierarchy_config::HierarchyConfig;
pub use observability_config::ObservabilityConfig;
pub use rerank_config::RerankConfig;
pub use retrieval_config::{HybridFusionMode, RetrievalConfig};
pub use storage_config::StorageConfig;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_GRAPH_HOPS, MAX_HIERARCHY_LEVELS};
use crate::errors::{StrataError, StrataResult};

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    pub storage: StorageConfig,
    pub hierarchy: HierarchyConfig,
    pub retrieval: RetrievalConfig,
    pub rerank: RerankConfig,
    pub observability: ObservabilityConfig,
}

impl StrataConfig {
    /// Parse a TOML document. Missing sections and fields fall back to defaults.
    pub fn from_toml(toml_str: &str) -> StrataResult<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| StrataError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no query or rebuild could run under.
    pub fn validate(&self) -> StrataResult<()> {
        let h = &self.hierarchy;
        if h.max_levels == 0 || h.max_levels > MAX_HIERARCHY_LEVELS {
            return Err(config_err(format!(
                "hierarchy.max_levels must be in 1..={MAX_HIERARCHY_LEVELS}, got {}",
                h.max_levels
            )));
        }
        if !(h.resolution.is_finite() && h.resolution > 0.0) {
            return Err(config_err("hierarchy.resolution must be positive".into()));
        }
        if !h.resolution_step.is_finite() || h.resolution_step < 0.0 {
            return Err(config_err("hierarchy.resolution_step must be >= 0".into()));
        }
        if h.enrichment_max_attempts == 0 {
            return Err(config_err("hierarchy.enrichment_max_attempts must be >= 1".into()));
        }
        if !(h.enrichment_backoff_multiplier.is_finite() && h.enrichment_backoff_multiplier >= 1.0)
        {
            return Err(config_err(
                "hierarchy.enrichment_backoff_multiplier must be >= 1".into(),
            ));
        }

        let r = &self.retrieval;
        if r.default_top_k == 0 || r.default_top_k > r.max_top_k {
            return Err(config_err(format!(
                "retrieval.default_top_k must be in 1..={}, got {}",
                r.max_top_k, r.default_top_k
            )));
        }
        if r.max_candidates == 0 {
            return Err(config_err("retrieval.max_candidates must be >= 1".into()));
        }
        if r.candidate_multiplier == 0 {
            return Err(config_err("retrieval.candidate_multiplier must be >= 1".into()));
        }
        if r.query_timeout_ms == 0 {
            return Err(config_err("retrieval.query_timeout_ms must be >= 1".into()));
        }
        if r.rrf_k == 0 {
            return Err(config_err("retrieval.rrf_k must be > 0".into()));
        }
        if !weight_ok(r.lexical_weight) || !weight_ok(r.vector_weight) {
            return Err(config_err("retrieval weights must be finite and >= 0".into()));
        }
        if r.lexical_weight + r.vector_weight == 0.0 {
            return Err(config_err("retrieval weights cannot both be 0".into()));
        }
        if r.max_hops > MAX_GRAPH_HOPS {
            return Err(config_err(format!(
                "retrieval.max_hops must be <= {MAX_GRAPH_HOPS}, got {}",
                r.max_hops
            )));
        }
        if !unit_interval(r.entity_match_threshold) || !unit_interval(r.hop_decay) {
            return Err(config_err(
                "retrieval.entity_match_threshold and hop_decay must be in [0, 1]".into(),
            ));
        }
        if !weight_ok(r.co_occurrence_boost) {
            return Err(config_err("retrieval.co_occurrence_boost must be >= 0".into()));
        }
        if r.community_beam_width == 0 {
            return Err(config_err("retrieval.community_beam_width must be >= 1".into()));
        }

        let rr = &self.rerank;
        if rr.top_n == 0 {
            return Err(config_err("rerank.top_n must be >= 1".into()));
        }
        if !unit_interval(rr.similarity_threshold) || !unit_interval(rr.discount_factor) {
            return Err(config_err(
                "rerank.similarity_threshold and discount_factor must be in [0, 1]".into(),
            ));
        }

        Ok(())
    }
}

fn config_err(message: String) -> StrataError {
    StrataError::ConfigError(message)
}

fn weight_ok(w: f64) -> bool {
    w.is_finite() && w >= 0.0
}

fn unit_interval(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}
