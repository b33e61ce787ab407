//! # strata-community
//!
//! Builds the graph-of-graphs: Louvain partitioning of the entity graph,
//! repeated over contracted community graphs, stored as an immutable arena
//! that queries read through an atomically swapped snapshot.

pub mod detector;
pub mod engine;
pub mod enrichment;
pub mod graph;
pub mod hierarchy;
pub mod snapshot;

pub use detector::{CommunityDetector, Partition};
pub use engine::HierarchyEngine;
pub use enrichment::{Enricher, EnrichmentReport, RetryPolicy};
pub use graph::LevelGraph;
pub use hierarchy::{BuildOutcome, Hierarchy, HierarchyBuilder, HierarchyLevel};
pub use snapshot::HierarchyHandle;
