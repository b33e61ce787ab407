use serde::{Deserialize, Serialize};

use super::defaults;

/// Community hierarchy construction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Maximum number of levels to build.
    pub max_levels: u32,
    /// Stop once a level has this many communities or fewer.
    pub min_communities: usize,
    /// Modularity resolution at level 1.
    pub resolution: f64,
    /// Resolution added for each level above the first.
    pub resolution_step: f64,
    /// Member descriptions passed to the summary provider per community.
    pub summary_max_members: usize,
    /// Attempts per community for summary and embedding calls.
    pub enrichment_max_attempts: u32,
    /// Delay before the first retry.
    pub enrichment_backoff_ms: u64,
    /// Multiplier applied to the delay after each failed attempt.
    pub enrichment_backoff_multiplier: f64,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            max_levels: defaults::DEFAULT_MAX_LEVELS,
            min_communities: defaults::DEFAULT_MIN_COMMUNITIES,
            resolution: defaults::DEFAULT_RESOLUTION,
            resolution_step: defaults::DEFAULT_RESOLUTION_STEP,
            summary_max_members: defaults::DEFAULT_SUMMARY_MAX_MEMBERS,
            enrichment_max_attempts: defaults::DEFAULT_ENRICHMENT_MAX_ATTEMPTS,
            enrichment_backoff_ms: defaults::DEFAULT_ENRICHMENT_BACKOFF_MS,
            enrichment_backoff_multiplier: defaults::DEFAULT_ENRICHMENT_BACKOFF_MULTIPLIER,
        }
    }
}

impl HierarchyConfig {
    /// Resolution used when clustering the graph at `level` (1-based).
    pub fn resolution_for_level(&self, level: u32) -> f64 {
        self.resolution + self.resolution_step * level.saturating_sub(1) as f64
    }
}
