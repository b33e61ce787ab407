//! # strata-core
//!
//! Foundation crate for the Strata community graph.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod similarity;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::StrataConfig;
pub use errors::{StrataError, StrataResult};
pub use models::{
    Chunk, ChunkMention, Community, Entity, NodeKind, NodeRef, PathHop, QueryClassification,
    QueryComplexity, QueryContext, QueryType, RebuildSummary, Relationship, SearchRequest, SearchResult,
    StrategyTag,
};
