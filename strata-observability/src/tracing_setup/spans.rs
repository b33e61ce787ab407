//! Span definitions per operation: rebuild, enrichment, search, strategy.

/// Span for one hierarchy rebuild.
#[macro_export]
macro_rules! rebuild_span {
    ($run_id:expr) => {
        tracing::info_span!("strata.rebuild", run_id = %$run_id)
    };
}

/// Span for the enrichment pass of one hierarchy level.
#[macro_export]
macro_rules! enrichment_span {
    ($level:expr, $communities:expr) => {
        tracing::info_span!("strata.enrichment", level = $level, communities = $communities)
    };
}

/// Span for one search request.
#[macro_export]
macro_rules! search_span {
    ($query:expr, $top_k:expr) => {
        tracing::info_span!("strata.search", query = %$query, top_k = $top_k)
    };
}

/// Span for one strategy executor run.
#[macro_export]
macro_rules! strategy_span {
    ($strategy:expr) => {
        tracing::info_span!("strata.strategy", strategy = %$strategy)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const REBUILD: &str = "strata.rebuild";
    pub const ENRICHMENT: &str = "strata.enrichment";
    pub const SEARCH: &str = "strata.search";
    pub const STRATEGY: &str = "strata.strategy";
}
