use serde::{Deserialize, Serialize};
use strata_core::models::RebuildSummary;

/// Rebuild history counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RebuildMetrics {
    pub rebuilds: u64,
    pub rejected_rebuilds: u64,
    pub failed_rebuilds: u64,
    pub summaries_failed: u64,
    pub embeddings_failed: u64,
    pub last_rebuild: Option<RebuildSummary>,
}

impl RebuildMetrics {
    pub fn record_rebuild(&mut self, summary: &RebuildSummary) {
        self.rebuilds += 1;
        self.summaries_failed += summary.summaries_failed as u64;
        self.embeddings_failed += summary.embeddings_failed as u64;
        self.last_rebuild = Some(summary.clone());
    }

    pub fn record_rejected(&mut self) {
        self.rejected_rebuilds += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed_rebuilds += 1;
    }
}
