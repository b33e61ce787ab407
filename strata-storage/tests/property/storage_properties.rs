use proptest::prelude::*;

use strata_core::models::{Entity, Relationship};
use strata_core::traits::IGraphStore;
use strata_storage::StorageEngine;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Stored weights are always in (0, 1]; zero weights never reach the table.
    #[test]
    fn stored_weights_are_positive(weights in prop::collection::vec(0.0f64..=1.0, 1..12)) {
        let store = StorageEngine::open_in_memory().unwrap();
        store.upsert_entity(&Entity::new("a", "A", "t")).unwrap();
        store.upsert_entity(&Entity::new("b", "B", "t")).unwrap();

        let mut expected = 0;
        for (i, w) in weights.iter().enumerate() {
            let w = if i % 3 == 0 { 0.0 } else { *w };
            store.upsert_relationship(&Relationship::new("a", "b", format!("r{i}"), w)).unwrap();
            if w > 0.0 {
                expected += 1;
            }
        }

        let stored = store.get_relationships().unwrap();
        prop_assert_eq!(stored.len(), expected);
        for rel in stored {
            prop_assert!(rel.weight > 0.0 && rel.weight <= 1.0);
        }
    }

    /// Vector search never returns more than the limit and is sorted descending.
    #[test]
    fn vector_search_sorted_and_bounded(
        vectors in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 3), 1..20),
        limit in 1usize..10,
    ) {
        use strata_core::models::Chunk;
        let store = StorageEngine::open_in_memory().unwrap();
        for (i, v) in vectors.iter().enumerate() {
            store.upsert_chunk(&Chunk::new(format!("c{i:02}"), "d", "text").with_embedding(v.clone())).unwrap();
        }
        let hits = store.search_chunks_by_vector(&[0.3, 0.5, 0.2], limit).unwrap();
        prop_assert!(hits.len() <= limit);
        for pair in hits.windows(2) {
            prop_assert!(pair[0].1 >= pair[1].1);
        }
    }
}
