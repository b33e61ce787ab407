use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use strata_core::config::{HybridFusionMode, RerankConfig, RetrievalConfig};
use strata_core::models::{Chunk, ChunkMention, Entity, QueryContext, SearchResult, StrategyTag};
use strata_core::traits::{IGraphStore, IStrategyExecutor};
use strata_retrieval::strategies::{co_occurrence_score, EntityAwareExecutor, HybridExecutor};
use strata_retrieval::{Reranker, ResultFuser};
use strata_storage::StorageEngine;

fn hybrid(mode: HybridFusionMode) -> HybridExecutor {
    let config = RetrievalConfig { hybrid_fusion: mode, ..RetrievalConfig::default() };
    HybridExecutor::from_config(Arc::new(StorageEngine::open_in_memory().unwrap()), &config)
}

fn position(fused: &[(String, f64)], id: &str) -> usize {
    fused.iter().position(|(i, _)| i == id).unwrap()
}

fn scored_lists() -> impl Strategy<Value = (Vec<f64>, Vec<f64>, usize, usize, f64)> {
    (2usize..12).prop_flat_map(|n| {
        (
            prop::collection::vec(0.0f64..10.0, n),
            prop::collection::vec(0.0f64..1.0, n),
            0..n,
            0..n,
            0.0f64..5.0,
        )
    })
}

fn candidates() -> impl Strategy<Value = Vec<SearchResult>> {
    prop::collection::vec((0u8..8, -2.0f64..2.0, -1.0f32..1.0, -1.0f32..1.0), 0..24).prop_map(|items| {
        items
            .into_iter()
            .map(|(id, score, x, y)| {
                let chunk = Chunk::new(format!("c{id}"), "doc", format!("text {id}")).with_embedding(vec![x, y]);
                SearchResult::new(chunk, score, StrategyTag::Vector)
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Raising one candidate's lexical score never lets an untouched candidate
    /// overtake it, in either fusion mode.
    #[test]
    fn fusion_is_monotone_in_lexical_score((lexical, vector, a, b, delta) in scored_lists()) {
        prop_assume!(a != b);
        let id = |i: usize| format!("c{i:02}");
        let lexical_list: Vec<(String, f64)> = lexical.iter().enumerate().map(|(i, s)| (id(i), *s)).collect();
        let vector_list: Vec<(String, f64)> = vector.iter().enumerate().map(|(i, s)| (id(i), *s)).collect();
        let mut raised = lexical_list.clone();
        raised[a].1 += delta;

        for mode in [HybridFusionMode::Rrf, HybridFusionMode::Weighted] {
            let executor = hybrid(mode);
            let before = executor.fuse_lists(&lexical_list, &vector_list);
            let after = executor.fuse_lists(&raised, &vector_list);
            if position(&before, &id(a)) < position(&before, &id(b)) {
                prop_assert!(position(&after, &id(a)) < position(&after, &id(b)), "{:?}", mode);
            }
        }
    }

    /// Reranker output has unique chunk ids and respects min(top_n, top_k).
    #[test]
    fn rerank_is_deduplicated_and_bounded(
        pool in candidates(),
        top_n in 1usize..10,
        top_k in 1usize..10,
        diversity in any::<bool>(),
    ) {
        let config = RerankConfig { top_n, diversity_enabled: diversity, ..RerankConfig::default() };
        let unique_in: HashSet<String> = pool.iter().map(|r| r.chunk_id().to_string()).collect();
        let out = Reranker::new(config, None).rerank("q", pool, top_k);

        let unique_out: HashSet<&str> = out.iter().map(SearchResult::chunk_id).collect();
        prop_assert_eq!(unique_out.len(), out.len());
        prop_assert!(out.len() <= top_n.min(top_k));
        prop_assert_eq!(out.len(), unique_in.len().min(top_n).min(top_k));
        prop_assert!(out.windows(2).all(|w| w[0].rerank_score >= w[1].rerank_score));
    }

    /// The fuser emits each chunk once, at its best score, within the bound.
    #[test]
    fn fuser_keeps_best_instance(pool in candidates(), max_candidates in 1usize..12) {
        let best: std::collections::HashMap<String, f64> = pool.iter().fold(Default::default(), |mut acc, r| {
            let slot = acc.entry(r.chunk_id().to_string()).or_insert(f64::NEG_INFINITY);
            *slot = slot.max(r.score);
            acc
        });
        let fused = ResultFuser::new(max_candidates).fuse(pool);

        let ids: HashSet<&str> = fused.iter().map(SearchResult::chunk_id).collect();
        prop_assert_eq!(ids.len(), fused.len());
        prop_assert!(fused.len() <= max_candidates);
        for r in &fused {
            prop_assert_eq!(r.score, best[r.chunk_id()]);
        }
    }

    /// Covering one more query entity never lowers a chunk's score.
    #[test]
    fn co_occurrence_score_never_drops_when_an_entity_is_added(
        evidence in prop::collection::vec(0.0f64..1.0, 1..6),
        extra in 0.0f64..1.0,
        boost in 0.0f64..2.0,
    ) {
        let mut extended = evidence.clone();
        extended.push(extra);
        prop_assert!(co_occurrence_score(&extended, boost) >= co_occurrence_score(&evidence, boost));
    }

    #[test]
    fn entity_aware_chunk_covering_more_entities_ranks_no_lower(
        saliences in prop::collection::vec(0.01f64..1.0, 2..5),
        boost in 0.0f64..2.0,
    ) {
        let store = Arc::new(StorageEngine::open_in_memory().unwrap());
        let last = saliences.len() - 1;
        store.upsert_chunk(&Chunk::new("fewer", "doc", "fewer entities")).unwrap();
        store.upsert_chunk(&Chunk::new("more", "doc", "more entities")).unwrap();
        let mut entities = Vec::new();
        for (i, salience) in saliences.iter().enumerate() {
            let entity = Entity::new(format!("e{i}"), format!("Entity {i}"), "thing");
            store.upsert_entity(&entity).unwrap();
            store.add_mention(&ChunkMention::new("more", &entity.id, *salience)).unwrap();
            if i < last {
                store.add_mention(&ChunkMention::new("fewer", &entity.id, *salience)).unwrap();
            }
            entities.push(entity);
        }

        let executor = EntityAwareExecutor::new(store, 0, 0.5, boost);
        let results = executor.search(&QueryContext::new("entities").with_entities(entities), 10).unwrap();
        let score = |id: &str| results.iter().find(|r| r.chunk_id() == id).unwrap().score;
        prop_assert!(score("more") >= score("fewer"));
    }
}
