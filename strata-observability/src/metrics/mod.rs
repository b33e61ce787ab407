//! Central metrics registry.

pub mod rebuild_metrics;
pub mod retrieval_metrics;

pub use rebuild_metrics::RebuildMetrics;
pub use retrieval_metrics::{RetrievalMetrics, StrategyCounters};

/// Owns the domain-specific collectors.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct MetricsCollector {
    pub retrieval: RetrievalMetrics,
    pub rebuild: RebuildMetrics,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
