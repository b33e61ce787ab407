//! Query log: query text, strategies, latency, result count, failed strategies.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strata_core::models::StrategyTag;

/// A single query log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub id: String,
    pub query: String,
    pub strategies: Vec<StrategyTag>,
    /// Strategies that errored, panicked, or timed out.
    pub failed_strategies: Vec<StrategyTag>,
    pub latency: Duration,
    pub result_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl QueryLogEntry {
    /// Create a new entry with a fresh id and the timestamp set to now.
    pub fn new(
        query: impl Into<String>,
        strategies: Vec<StrategyTag>,
        failed_strategies: Vec<StrategyTag>,
        latency: Duration,
        result_count: usize,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            query: query.into(),
            strategies,
            failed_strategies,
            latency,
            result_count,
            timestamp: Utc::now(),
        }
    }
}

/// Bounded query log; the oldest entries fall off once capacity is reached.
#[derive(Debug, Clone)]
pub struct QueryLog {
    entries: VecDeque<QueryLogEntry>,
    max_entries: usize,
}

impl Default for QueryLog {
    fn default() -> Self {
        Self::with_capacity(strata_core::config::defaults::DEFAULT_QUERY_LOG_CAPACITY)
    }
}

impl QueryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self { entries: VecDeque::new(), max_entries: max_entries.max(1) }
    }

    pub fn record(&mut self, entry: QueryLogEntry) {
        tracing::debug!(
            event = "query_logged",
            query = %entry.query,
            strategies = ?entry.strategies,
            failed = ?entry.failed_strategies,
            latency_ms = entry.latency.as_millis() as u64,
            result_count = entry.result_count,
            "query logged"
        );

        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Entries oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &QueryLogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&QueryLogEntry> {
        self.entries.back()
    }

    pub fn avg_latency(&self) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.entries.iter().map(|e| e.latency).sum();
        total / self.entries.len() as u32
    }

    /// Latency at the given percentile (0.0 to 1.0).
    pub fn latency_percentile(&self, p: f64) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let mut latencies: Vec<Duration> = self.entries.iter().map(|e| e.latency).collect();
        latencies.sort();
        let idx = ((p.clamp(0.0, 1.0) * (latencies.len() - 1) as f64).round() as usize)
            .min(latencies.len() - 1);
        latencies[idx]
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }
}
