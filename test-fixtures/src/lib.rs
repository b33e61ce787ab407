//! Test fixture loader for Strata graph datasets, plus deterministic provider stubs
//! shared by the integration tests of every crate.

pub mod stubs;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use strata_core::models::{Chunk, ChunkMention, Entity, Relationship};
use strata_core::traits::{IEmbeddingProvider, IGraphStore};
use strata_core::StrataResult;

/// Root directory of the test-fixtures folder.
fn fixtures_root() -> PathBuf {
    // Works from any crate in the workspace: walk up to find test-fixtures.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);

    while !path.join("test-fixtures").exists() {
        if !path.pop() {
            panic!("Could not find test-fixtures directory from CARGO_MANIFEST_DIR={manifest_dir}");
        }
    }
    path.join("test-fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// A small knowledge graph with its source chunks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphFixture {
    #[serde(default)]
    pub description: String,
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
    #[serde(default)]
    pub mentions: Vec<ChunkMention>,
    /// Free-form expectations checked by the test that loads the fixture.
    #[serde(default)]
    pub expected: serde_json::Value,
}

/// Load `graphs/<name>.json`.
pub fn load_graph(name: &str) -> GraphFixture {
    load_fixture(&format!("graphs/{name}.json"))
}

/// Embed every chunk text and entity name with `embedder`.
pub fn with_embeddings(mut fixture: GraphFixture, embedder: &dyn IEmbeddingProvider) -> GraphFixture {
    for chunk in &mut fixture.chunks {
        chunk.embedding = embedder.embed(&chunk.text).ok();
    }
    for entity in &mut fixture.entities {
        entity.embedding = embedder.embed(&entity.name).ok();
    }
    fixture
}

/// Write every record of `fixture` into `store`.
pub fn seed_store(store: &dyn IGraphStore, fixture: &GraphFixture) -> StrataResult<()> {
    for entity in &fixture.entities {
        store.upsert_entity(entity)?;
    }
    for relationship in &fixture.relationships {
        store.upsert_relationship(relationship)?;
    }
    for chunk in &fixture.chunks {
        store.upsert_chunk(chunk)?;
    }
    for mention in &fixture.mentions {
        store.add_mention(mention)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_root_exists() {
        assert!(fixtures_root().exists(), "test-fixtures directory not found");
    }

    #[test]
    fn graph_fixtures_parse_and_reference_known_entities() {
        for name in ["two_triangles", "nested_clusters", "acme_corpus"] {
            assert!(fixture_exists(&format!("graphs/{name}.json")), "Missing fixture: {name}");
            let fixture = load_graph(name);
            let ids: std::collections::HashSet<&str> =
                fixture.entities.iter().map(|e| e.id.as_str()).collect();
            for rel in &fixture.relationships {
                assert!(ids.contains(rel.source_id.as_str()), "{name}: unknown {}", rel.source_id);
                assert!(ids.contains(rel.target_id.as_str()), "{name}: unknown {}", rel.target_id);
            }
            for mention in &fixture.mentions {
                assert!(ids.contains(mention.entity_id.as_str()));
                assert!(fixture.chunks.iter().any(|c| c.id == mention.chunk_id));
            }
        }
    }
}
