//! # strata-observability
//!
//! Structured JSON tracing with span definitions, a bounded query log, and
//! metrics for retrieval strategies and hierarchy rebuilds.

pub mod engine;
pub mod metrics;
pub mod query_log;
pub mod tracing_setup;

pub use engine::ObservabilityEngine;
pub use metrics::MetricsCollector;
pub use query_log::{QueryLog, QueryLogEntry};
