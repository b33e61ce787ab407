use crate::errors::StrataResult;
use crate::models::{Chunk, ChunkMention, Community, Entity, NodeRef, Relationship};

/// Persistent access to entities, relationships, chunks, and communities.
pub trait IGraphStore: Send + Sync {
    // --- Entities ---
    fn upsert_entity(&self, entity: &Entity) -> StrataResult<()>;
    fn get_entity(&self, id: &str) -> StrataResult<Option<Entity>>;
    /// All entities, ordered by id.
    fn get_entities(&self) -> StrataResult<Vec<Entity>>;
    /// Case-insensitive match on canonical name or any alias.
    fn find_entities_by_name(&self, name: &str) -> StrataResult<Vec<Entity>>;
    fn search_entities_by_vector(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> StrataResult<Vec<(Entity, f64)>>;
    fn count_entities(&self) -> StrataResult<usize>;

    // --- Relationships ---
    /// Weight-0 relationships are skipped; weights outside [0, 1] are rejected.
    fn upsert_relationship(&self, relationship: &Relationship) -> StrataResult<()>;
    fn get_relationships(&self) -> StrataResult<Vec<Relationship>>;
    /// Relationships where the entity is source or target.
    fn get_relationships_for_entity(&self, entity_id: &str) -> StrataResult<Vec<Relationship>>;

    // --- Chunks ---
    fn upsert_chunk(&self, chunk: &Chunk) -> StrataResult<()>;
    fn get_chunk(&self, id: &str) -> StrataResult<Option<Chunk>>;
    fn add_mention(&self, mention: &ChunkMention) -> StrataResult<()>;
    /// Chunks mentioning the entity with their salience, most salient first.
    fn get_chunks_mentioning_entity(&self, entity_id: &str) -> StrataResult<Vec<(Chunk, f64)>>;
    /// Cosine similarity search over chunk embeddings, best first.
    fn search_chunks_by_vector(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> StrataResult<Vec<(Chunk, f64)>>;
    /// Keyword search over chunk text; higher score is more relevant.
    fn search_chunks_lexical(&self, query: &str, limit: usize) -> StrataResult<Vec<(Chunk, f64)>>;

    // --- Communities ---
    fn create_community(&self, community: &Community) -> StrataResult<()>;
    /// Record membership; member communities get `community_id` as parent.
    fn link_members_to_community(&self, members: &[NodeRef], community_id: &str)
        -> StrataResult<()>;
    fn get_community_by_id(&self, id: &str) -> StrataResult<Option<Community>>;
    /// All communities ordered by level, then id.
    fn get_all_communities(&self) -> StrataResult<Vec<Community>>;
    fn search_communities_by_vector(
        &self,
        embedding: &[f32],
        level: Option<u32>,
        limit: usize,
    ) -> StrataResult<Vec<(Community, f64)>>;
    fn clear_communities(&self) -> StrataResult<()>;
    /// Discard every community and write `communities` in one transaction.
    fn replace_hierarchy(&self, communities: &[Community]) -> StrataResult<()>;
}
