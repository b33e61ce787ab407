mod chunk;
mod community;
mod entity;
mod node_ref;
mod query;
mod rebuild_summary;
mod relationship;
mod search_result;

pub use chunk::{Chunk, ChunkMention};
pub use community::Community;
pub use entity::Entity;
pub use node_ref::{NodeKind, NodeRef};
pub use query::{
    QueryClassification, QueryComplexity, QueryContext, QueryType, SearchRequest, StrategyTag,
};
pub use rebuild_summary::RebuildSummary;
pub use relationship::Relationship;
pub use search_result::{PathHop, SearchResult};
