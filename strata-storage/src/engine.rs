//! StorageEngine: owns the connection pool and implements IGraphStore.

use std::path::Path;

use tracing::{debug, info};

use strata_core::config::StorageConfig;
use strata_core::errors::{HierarchyError, StrataResult};
use strata_core::models::{Chunk, ChunkMention, Community, Entity, NodeRef, Relationship};
use strata_core::traits::IGraphStore;

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{
    chunk_ops, community_ops, entity_ops, lexical_search, relationship_ops, vector_search,
};

/// SQLite-backed graph store.
pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path, config: &StorageConfig) -> StrataResult<Self> {
        let pool = ConnectionPool::open(path, config)?;
        let engine = Self { pool };
        engine.initialize()?;
        info!(path = %path.display(), "opened graph store");
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> StrataResult<Self> {
        let pool = ConnectionPool::open_in_memory(&StorageConfig::default())?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> StrataResult<()> {
        self.pool.write(|conn| {
            let version = migrations::run_migrations(conn)?;
            debug!(version, "schema ready");
            Ok(())
        })
    }

    /// The underlying connections.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

impl IGraphStore for StorageEngine {
    fn upsert_entity(&self, entity: &Entity) -> StrataResult<()> {
        self.pool.write(|conn| entity_ops::upsert_entity(conn, entity))
    }

    fn get_entity(&self, id: &str) -> StrataResult<Option<Entity>> {
        self.pool.read(|conn| entity_ops::get_entity(conn, id))
    }

    fn get_entities(&self) -> StrataResult<Vec<Entity>> {
        self.pool.read(entity_ops::get_entities)
    }

    fn find_entities_by_name(&self, name: &str) -> StrataResult<Vec<Entity>> {
        self.pool.read(|conn| entity_ops::find_entities_by_name(conn, name))
    }

    fn search_entities_by_vector(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> StrataResult<Vec<(Entity, f64)>> {
        self.pool.read(|conn| vector_search::search_entities(conn, embedding, limit))
    }

    fn count_entities(&self) -> StrataResult<usize> {
        self.pool.read(entity_ops::count_entities)
    }

    fn upsert_relationship(&self, relationship: &Relationship) -> StrataResult<()> {
        self.pool.write(|conn| {
            relationship_ops::upsert_relationship(conn, relationship)?;
            Ok(())
        })
    }

    fn get_relationships(&self) -> StrataResult<Vec<Relationship>> {
        self.pool.read(relationship_ops::get_relationships)
    }

    fn get_relationships_for_entity(&self, entity_id: &str) -> StrataResult<Vec<Relationship>> {
        self.pool.read(|conn| relationship_ops::get_relationships_for_entity(conn, entity_id))
    }

    fn upsert_chunk(&self, chunk: &Chunk) -> StrataResult<()> {
        self.pool.write(|conn| chunk_ops::upsert_chunk(conn, chunk))
    }

    fn get_chunk(&self, id: &str) -> StrataResult<Option<Chunk>> {
        self.pool.read(|conn| chunk_ops::get_chunk(conn, id))
    }

    fn add_mention(&self, mention: &ChunkMention) -> StrataResult<()> {
        self.pool.write(|conn| chunk_ops::add_mention(conn, mention))
    }

    fn get_chunks_mentioning_entity(&self, entity_id: &str) -> StrataResult<Vec<(Chunk, f64)>> {
        self.pool.read(|conn| chunk_ops::get_chunks_mentioning_entity(conn, entity_id))
    }

    fn search_chunks_by_vector(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> StrataResult<Vec<(Chunk, f64)>> {
        self.pool.read(|conn| vector_search::search_chunks(conn, embedding, limit))
    }

    fn search_chunks_lexical(&self, query: &str, limit: usize) -> StrataResult<Vec<(Chunk, f64)>> {
        self.pool.read(|conn| lexical_search::search_chunks(conn, query, limit))
    }

    fn create_community(&self, community: &Community) -> StrataResult<()> {
        self.pool.write(|conn| community_ops::insert_community(conn, community))
    }

    fn link_members_to_community(
        &self,
        members: &[NodeRef],
        community_id: &str,
    ) -> StrataResult<()> {
        self.pool.write(|conn| community_ops::link_members(conn, members, community_id))
    }

    fn get_community_by_id(&self, id: &str) -> StrataResult<Option<Community>> {
        self.pool.read(|conn| community_ops::get_community(conn, id))
    }

    fn get_all_communities(&self) -> StrataResult<Vec<Community>> {
        self.pool.read(community_ops::get_all_communities)
    }

    fn search_communities_by_vector(
        &self,
        embedding: &[f32],
        level: Option<u32>,
        limit: usize,
    ) -> StrataResult<Vec<(Community, f64)>> {
        self.pool.read(|conn| vector_search::search_communities(conn, embedding, level, limit))
    }

    fn clear_communities(&self) -> StrataResult<()> {
        self.pool.write(community_ops::clear_communities)
    }

    fn replace_hierarchy(&self, communities: &[Community]) -> StrataResult<()> {
        self.pool.transaction(|tx| community_ops::replace_hierarchy(tx, communities))
            .map_err(|e| {
                HierarchyError::PersistFailed {
                    communities: communities.len(),
                    reason: e.to_string(),
                }
                .into()
            })
    }
}
