//! Per-strategy invocation, failure, and timeout counts plus query hit rate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_core::models::StrategyTag;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyCounters {
    pub invocations: u64,
    pub failures: u64,
    pub timeouts: u64,
    /// Results the strategy contributed before fusion.
    pub results: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalMetrics {
    pub per_strategy: BTreeMap<StrategyTag, StrategyCounters>,
    pub total_queries: u64,
    /// Queries that returned at least one result.
    pub hits: u64,
    pub rejected_queries: u64,
}

impl RetrievalMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_query(&mut self, result_count: usize) {
        self.total_queries += 1;
        if result_count > 0 {
            self.hits += 1;
        }
    }

    pub fn record_rejected(&mut self) {
        self.rejected_queries += 1;
    }

    pub fn record_strategy_success(&mut self, tag: StrategyTag, results: usize) {
        let counters = self.per_strategy.entry(tag).or_default();
        counters.invocations += 1;
        counters.results += results as u64;
    }

    pub fn record_strategy_failure(&mut self, tag: StrategyTag) {
        let counters = self.per_strategy.entry(tag).or_default();
        counters.invocations += 1;
        counters.failures += 1;
    }

    pub fn record_strategy_timeout(&mut self, tag: StrategyTag) {
        let counters = self.per_strategy.entry(tag).or_default();
        counters.invocations += 1;
        counters.timeouts += 1;
    }

    pub fn strategy(&self, tag: StrategyTag) -> StrategyCounters {
        self.per_strategy.get(&tag).copied().unwrap_or_default()
    }

    pub fn hit_rate(&self) -> f64 {
        if self.total_queries == 0 {
            return 0.0;
        }
        self.hits as f64 / self.total_queries as f64
    }
}
