//! [`ObservabilityEngine`]: owns the metrics collectors and the query log.

use strata_core::config::ObservabilityConfig;
use strata_core::errors::{StrataError, StrataResult};

use crate::metrics::MetricsCollector;
use crate::query_log::QueryLog;

#[derive(Debug, Default)]
pub struct ObservabilityEngine {
    pub metrics: MetricsCollector,
    pub query_log: QueryLog,
}

impl ObservabilityEngine {
    pub fn new(config: &ObservabilityConfig) -> Self {
        Self {
            metrics: MetricsCollector::new(),
            query_log: QueryLog::with_capacity(config.query_log_capacity),
        }
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Current metrics and query log aggregates as JSON.
    pub fn metrics_snapshot(&self) -> StrataResult<serde_json::Value> {
        let metrics_json = serde_json::to_value(&self.metrics).map_err(StrataError::SerializationError)?;
        Ok(serde_json::json!({
            "metrics": metrics_json,
            "query_log_count": self.query_log.count(),
            "query_avg_latency_ms": self.query_log.avg_latency().as_millis() as u64,
            "query_p95_latency_ms": self.query_log.latency_percentile(0.95).as_millis() as u64,
        }))
    }
}
