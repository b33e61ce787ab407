use serde::{Deserialize, Serialize};

/// Outcome of one hierarchy rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RebuildSummary {
    pub run_id: String,
    pub levels_created: u32,
    pub total_communities: usize,
    /// Community count per level, index 0 = level 1.
    pub communities_per_level: Vec<usize>,
    /// Detector modularity per level, index 0 = level 1.
    pub modularity_per_level: Vec<f64>,
    pub summaries_failed: usize,
    pub embeddings_failed: usize,
    pub duration_ms: u64,
}
