//! GraphStore contract tests against the in-memory engine.

use strata_core::errors::{HierarchyError, StorageError};
use strata_core::models::*;
use strata_core::traits::IGraphStore;
use strata_core::StrataError;
use strata_storage::StorageEngine;

fn seeded() -> StorageEngine {
    let store = StorageEngine::open_in_memory().unwrap();
    store
        .upsert_entity(
            &Entity::new("e-acme", "Acme Corp", "organization")
                .with_description("Maker of anvils")
                .with_aliases(vec!["ACME".into(), "Acme Corporation".into()])
                .with_embedding(vec![1.0, 0.0, 0.0]),
        )
        .unwrap();
    store
        .upsert_entity(&Entity::new("e-road", "Road Runner", "character").with_embedding(vec![0.0, 1.0, 0.0]))
        .unwrap();
    store
        .upsert_relationship(&Relationship::new("e-road", "e-acme", "buys_from", 0.6))
        .unwrap();
    store
        .upsert_chunk(
            &Chunk::new("c1", "doc-1", "Acme Corp ships anvils to the desert")
                .with_embedding(vec![0.9, 0.1, 0.0]),
        )
        .unwrap();
    store
        .upsert_chunk(
            &Chunk::new("c2", "doc-1", "The Road Runner outruns every anvil")
                .with_embedding(vec![0.1, 0.9, 0.0])
                .with_index(1),
        )
        .unwrap();
    store.add_mention(&ChunkMention::new("c1", "e-acme", 0.9)).unwrap();
    store.add_mention(&ChunkMention::new("c2", "e-road", 0.8)).unwrap();
    store.add_mention(&ChunkMention::new("c2", "e-acme", 0.3)).unwrap();
    store
}

#[test]
fn entity_roundtrip_keeps_aliases_and_embedding() {
    let store = seeded();
    let acme = store.get_entity("e-acme").unwrap().unwrap();
    assert_eq!(acme.name, "Acme Corp");
    assert_eq!(acme.aliases, vec!["ACME".to_string(), "Acme Corporation".to_string()]);
    assert_eq!(acme.embedding, Some(vec![1.0, 0.0, 0.0]));
    assert!(store.get_entity("missing").unwrap().is_none());
    assert_eq!(store.count_entities().unwrap(), 2);
}

#[test]
fn find_by_name_matches_alias_case_insensitively() {
    let store = seeded();
    let by_alias = store.find_entities_by_name("acme corporation").unwrap();
    assert_eq!(by_alias.len(), 1);
    assert_eq!(by_alias[0].id, "e-acme");

    let by_name = store.find_entities_by_name("  road runner ").unwrap();
    assert_eq!(by_name[0].id, "e-road");

    assert!(store.find_entities_by_name("Coyote").unwrap().is_empty());
}

#[test]
fn zero_weight_relationship_is_not_stored() {
    let store = seeded();
    store
        .upsert_relationship(&Relationship::new("e-acme", "e-road", "ignores", 0.0))
        .unwrap();
    let rels = store.get_relationships().unwrap();
    assert_eq!(rels.len(), 1);
    assert_eq!(rels[0].relationship_type, "buys_from");
}

#[test]
fn out_of_range_weight_is_rejected() {
    let store = seeded();
    let err = store
        .upsert_relationship(&Relationship::new("e-acme", "e-road", "owns", 1.5))
        .unwrap_err();
    assert!(matches!(
        err,
        StrataError::StorageError(StorageError::InvalidRecord { .. })
    ));
}

#[test]
fn relationships_for_entity_cover_both_directions() {
    let store = seeded();
    assert_eq!(store.get_relationships_for_entity("e-acme").unwrap().len(), 1);
    assert_eq!(store.get_relationships_for_entity("e-road").unwrap().len(), 1);
}

#[test]
fn chunks_mentioning_entity_ordered_by_salience() {
    let store = seeded();
    let chunks = store.get_chunks_mentioning_entity("e-acme").unwrap();
    let ids: Vec<&str> = chunks.iter().map(|(c, _)| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2"]);
    assert!((chunks[0].1 - 0.9).abs() < 1e-9);
}

#[test]
fn vector_search_ranks_by_cosine() {
    let store = seeded();
    let hits = store.search_chunks_by_vector(&[1.0, 0.0, 0.0], 5).unwrap();
    assert_eq!(hits[0].0.id, "c1");
    assert!(hits[0].1 > hits[1].1);

    let entities = store.search_entities_by_vector(&[0.0, 1.0, 0.0], 1).unwrap();
    assert_eq!(entities[0].0.id, "e-road");
}

#[test]
fn vector_search_skips_dimension_mismatch() {
    let store = seeded();
    assert!(store.search_chunks_by_vector(&[1.0, 0.0], 5).unwrap().is_empty());
}

#[test]
fn lexical_search_finds_keyword_matches() {
    let store = seeded();
    let hits = store.search_chunks_lexical("desert anvils", 10).unwrap();
    assert_eq!(hits[0].0.id, "c1");
    assert!(hits.iter().all(|(_, score)| *score > 0.0));
    assert!(store.search_chunks_lexical("?!", 10).unwrap().is_empty());
}

#[test]
fn lexical_index_follows_chunk_updates() {
    let store = seeded();
    store
        .upsert_chunk(&Chunk::new("c1", "doc-1", "Completely rewritten about rockets"))
        .unwrap();
    assert!(store
        .search_chunks_lexical("desert", 10)
        .unwrap()
        .iter()
        .all(|(c, _)| c.id != "c1"));
    assert_eq!(store.search_chunks_lexical("rockets", 10).unwrap()[0].0.id, "c1");
}

fn two_level_hierarchy() -> Vec<Community> {
    let mut leaf = Community::new("c1-a", 1, vec![NodeRef::entity("e-acme"), NodeRef::entity("e-road")]);
    leaf.entity_count = 2;
    leaf.summary = Some("Desert commerce".into());
    leaf.embedding = Some(vec![0.5, 0.5, 0.0]);
    let mut top = Community::new("c2-a", 2, vec![NodeRef::community("c1-a")]);
    top.entity_count = 2;
    vec![leaf, top]
}

#[test]
fn replace_hierarchy_sets_parents_and_members() {
    let store = seeded();
    store.replace_hierarchy(&two_level_hierarchy()).unwrap();

    let leaf = store.get_community_by_id("c1-a").unwrap().unwrap();
    assert_eq!(leaf.parent_id.as_deref(), Some("c2-a"));
    assert_eq!(leaf.members.len(), 2);
    assert_eq!(leaf.summary.as_deref(), Some("Desert commerce"));

    let all = store.get_all_communities().unwrap();
    let levels: Vec<u32> = all.iter().map(|c| c.level).collect();
    assert_eq!(levels, vec![1, 2]);

    let hits = store
        .search_communities_by_vector(&[1.0, 1.0, 0.0], Some(1), 3)
        .unwrap();
    assert_eq!(hits[0].0.id, "c1-a");
}

#[test]
fn replace_hierarchy_discards_previous_communities() {
    let store = seeded();
    store.replace_hierarchy(&two_level_hierarchy()).unwrap();
    store
        .replace_hierarchy(&[Community::new("c1-b", 1, vec![NodeRef::entity("e-acme")])])
        .unwrap();
    let ids: Vec<String> = store
        .get_all_communities()
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec!["c1-b".to_string()]);
}

#[test]
fn failed_replace_leaves_old_hierarchy_intact() {
    let store = seeded();
    store.replace_hierarchy(&two_level_hierarchy()).unwrap();

    // The same entity under two parents violates the forest constraint.
    let broken = vec![
        Community::new("c1-x", 1, vec![NodeRef::entity("e-acme")]),
        Community::new("c1-y", 1, vec![NodeRef::entity("e-acme")]),
    ];
    let err = store.replace_hierarchy(&broken).unwrap_err();
    assert!(matches!(
        err,
        StrataError::HierarchyError(HierarchyError::PersistFailed { communities: 2, .. })
    ));

    let ids: Vec<String> = store
        .get_all_communities()
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec!["c1-a".to_string(), "c2-a".to_string()]);
}

#[test]
fn clear_communities_removes_everything() {
    let store = seeded();
    store.replace_hierarchy(&two_level_hierarchy()).unwrap();
    store.clear_communities().unwrap();
    assert!(store.get_all_communities().unwrap().is_empty());
}

#[test]
fn create_and_link_individually() {
    let store = seeded();
    let community = Community::new("c1-solo", 1, Vec::new());
    store.create_community(&community).unwrap();
    store
        .link_members_to_community(&[NodeRef::entity("e-road")], "c1-solo")
        .unwrap();
    let loaded = store.get_community_by_id("c1-solo").unwrap().unwrap();
    assert_eq!(loaded.members, vec![NodeRef::entity("e-road")]);
}
