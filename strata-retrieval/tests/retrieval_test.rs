//! End-to-end retrieval tests over the acme corpus: executors, fan-out failure
//! handling, validation, and fallback behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;

use strata_community::{HierarchyEngine, HierarchyHandle};
use strata_core::config::{HierarchyConfig, RerankConfig, RetrievalConfig};
use strata_core::errors::RetrievalError;
use strata_core::models::{
    Chunk, ChunkMention, Entity, QueryClassification, QueryComplexity, QueryContext, QueryType, Relationship,
    SearchRequest, SearchResult, StrategyTag,
};
use strata_core::traits::{IEmbeddingProvider, IGraphStore, IStrategyExecutor};
use strata_core::{StrataError, StrataResult};
use strata_retrieval::strategies::{
    default_registry, CommunityExecutor, EntityAwareExecutor, GraphTraversalExecutor, HybridExecutor,
};
use strata_retrieval::{RetrievalEngine, StrategyRegistry};
use strata_storage::StorageEngine;
use test_fixtures::stubs::{HashEmbedder, JoinSummarizer, StaticClassifier};
use test_fixtures::{load_graph, seed_store, with_embeddings};

fn acme_store() -> Arc<StorageEngine> {
    let fixture = with_embeddings(load_graph("acme_corpus"), &HashEmbedder::default());
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    seed_store(store.as_ref(), &fixture).unwrap();
    store
}

fn entities(store: &StorageEngine, ids: &[&str]) -> Vec<Entity> {
    ids.iter().map(|id| store.get_entity(id).unwrap().unwrap()).collect()
}

fn ids(results: &[SearchResult]) -> Vec<&str> {
    results.iter().map(SearchResult::chunk_id).collect()
}

fn classification(query_type: QueryType, names: &[&str]) -> QueryClassification {
    QueryClassification {
        query_type,
        complexity: QueryComplexity::Medium,
        mentioned_entities: names.iter().map(|n| n.to_string()).collect(),
    }
}

fn acme_engine(store: Arc<StorageEngine>, config: RetrievalConfig) -> RetrievalEngine {
    let registry = default_registry(store.clone(), HierarchyHandle::default(), &config);
    RetrievalEngine::new(store, registry, config, RerankConfig::default())
        .with_embedder(Arc::new(HashEmbedder::default()))
}

/// Returns one fixed chunk and counts its calls.
struct CountingExecutor {
    tag: StrategyTag,
    calls: AtomicUsize,
}

impl CountingExecutor {
    fn new(tag: StrategyTag) -> Arc<Self> {
        Arc::new(Self { tag, calls: AtomicUsize::new(0) })
    }
}

impl IStrategyExecutor for CountingExecutor {
    fn tag(&self) -> StrategyTag {
        self.tag
    }

    fn search(&self, _query: &QueryContext, _top_k: usize) -> StrataResult<Vec<SearchResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![SearchResult::new(Chunk::new(format!("counted-{}", self.tag), "doc", "counted chunk"), 1.0, self.tag)])
    }
}

struct PanickingExecutor;

impl IStrategyExecutor for PanickingExecutor {
    fn tag(&self) -> StrategyTag {
        StrategyTag::GraphTraversal
    }

    fn search(&self, _query: &QueryContext, _top_k: usize) -> StrataResult<Vec<SearchResult>> {
        panic!("traversal exploded");
    }
}

struct SlowExecutor(Duration);

impl IStrategyExecutor for SlowExecutor {
    fn tag(&self) -> StrategyTag {
        StrategyTag::CommunityBased
    }

    fn search(&self, _query: &QueryContext, _top_k: usize) -> StrataResult<Vec<SearchResult>> {
        std::thread::sleep(self.0);
        Ok(vec![SearchResult::new(Chunk::new("late", "doc", "too late"), 10.0, StrategyTag::CommunityBased)])
    }
}

struct ErroringExecutor;

impl IStrategyExecutor for ErroringExecutor {
    fn tag(&self) -> StrategyTag {
        StrategyTag::Hybrid
    }

    fn search(&self, _query: &QueryContext, _top_k: usize) -> StrataResult<Vec<SearchResult>> {
        Err(RetrievalError::ExecutorFailed { strategy: "hybrid".into(), reason: "index offline".into() }.into())
    }
}

// --- Executors ---

#[test]
fn chunk_with_both_entities_outranks_single_entity_chunk() {
    let store = acme_store();
    for max_hops in [0, 2] {
        let executor = EntityAwareExecutor::new(store.clone(), max_hops, 0.5, 0.5);
        let query = QueryContext::new("What did Jane Doe do at Acme Corp?")
            .with_entities(entities(&store, &["jane", "acme"]));
        let results = executor.search(&query, 10).unwrap();

        let order = ids(&results);
        let both = order.iter().position(|id| *id == "ch1").unwrap();
        for acme_only in ["ch2", "ch4"] {
            let pos = order.iter().position(|id| *id == acme_only).unwrap();
            assert!(both < pos, "max_hops={max_hops}: {order:?}");
        }
        assert!((results[0].score - 0.9 * 1.5).abs() < 1e-9);
        assert!(results.iter().all(|r| r.strategy == StrategyTag::EntityAware));
    }
}

#[test]
fn weakly_mentioned_second_entity_does_not_sink_the_chunk() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    store.upsert_entity(&Entity::new("e1", "Acme", "organization")).unwrap();
    store.upsert_entity(&Entity::new("e2", "Globex", "organization")).unwrap();
    store.upsert_chunk(&Chunk::new("both", "doc", "Acme signed with Globex.")).unwrap();
    store.upsert_chunk(&Chunk::new("only1", "doc", "Acme hired staff.")).unwrap();
    store.add_mention(&ChunkMention::new("both", "e1", 0.9)).unwrap();
    store.add_mention(&ChunkMention::new("both", "e2", 0.1)).unwrap();
    store.add_mention(&ChunkMention::new("only1", "e1", 0.9)).unwrap();

    let executor = EntityAwareExecutor::new(store.clone(), 0, 0.5, 0.5);
    let query = QueryContext::new("Acme and Globex").with_entities(entities(&store, &["e1", "e2"]));
    let results = executor.search(&query, 10).unwrap();

    assert_eq!(ids(&results), vec!["both", "only1"]);
    assert!((results[0].score - 0.9 * 1.5).abs() < 1e-9);
    assert!((results[1].score - 0.9).abs() < 1e-9);
}

#[test]
fn entity_expansion_reaches_neighbor_chunks_with_decay() {
    let store = acme_store();
    let executor = EntityAwareExecutor::new(store.clone(), 1, 0.5, 0.5);
    let query = QueryContext::new("Tell me about Jane Doe").with_entities(entities(&store, &["jane"]));
    let results = executor.search(&query, 10).unwrap();

    // ch2 only mentions Acme, one hop from Jane: 0.7 · 0.9 · 0.5.
    let ch2 = results.iter().find(|r| r.chunk_id() == "ch2").unwrap();
    assert!((ch2.score - 0.315).abs() < 1e-9);
    assert!(!ids(&results).contains(&"ch6"));
}

#[test]
fn expired_relationships_are_not_expanded() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    store.upsert_entity(&Entity::new("p", "Pat", "person")).unwrap();
    store.upsert_entity(&Entity::new("q", "Quill Co", "organization")).unwrap();
    let until = chrono::Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    store
        .upsert_relationship(&Relationship::new("p", "q", "works_at", 0.8).with_validity(None, Some(until)))
        .unwrap();
    store.upsert_chunk(&Chunk::new("cq", "doc", "Quill Co makes pens.")).unwrap();
    store.add_mention(&ChunkMention::new("cq", "q", 0.9)).unwrap();

    let executor = EntityAwareExecutor::new(store.clone(), 2, 0.5, 0.5);
    let mut query = QueryContext::new("Where does Pat work?").with_entities(entities(&store, &["p"]));
    assert_eq!(ids(&executor.search(&query, 10).unwrap()), vec!["cq"]);

    query.as_of = Some(chrono::Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    assert!(executor.search(&query, 10).unwrap().is_empty());
}

#[test]
fn traversal_returns_path_evidence() {
    let store = acme_store();
    let executor = GraphTraversalExecutor::new(store.clone(), 2);
    let query = QueryContext::new("How is Jane Doe related to Rival Inc?")
        .with_entities(entities(&store, &["jane", "rival"]));
    let results = executor.search(&query, 10).unwrap();

    assert_eq!(ids(&results), vec!["ch1", "ch4"]);
    let path = results[0].reasoning_path.as_ref().unwrap();
    assert_eq!(path.len(), 2);
    assert_eq!(path[0].from_name, "Jane Doe");
    assert_eq!(path[0].relation, "founded");
    assert_eq!(path[1].to_name, "Rival Inc");
    assert!((results[0].score - 0.9 * 0.6 * 0.85).abs() < 1e-9);
}

#[test]
fn traversal_without_path_in_range_is_empty() {
    let store = acme_store();
    let executor = GraphTraversalExecutor::new(store.clone(), 2);
    // Jane → Acme → Rival → John is three hops.
    let query = QueryContext::new("Jane Doe and John Roe").with_entities(entities(&store, &["jane", "john"]));
    assert!(executor.search(&query, 10).unwrap().is_empty());

    let single = QueryContext::new("Jane Doe").with_entities(entities(&store, &["jane"]));
    assert!(executor.search(&single, 10).unwrap().is_empty());
}

#[test]
fn hybrid_search_combines_lexical_and_vector() {
    let store = acme_store();
    let query_text = "anvil market competition";
    let query = QueryContext::new(query_text).with_embedding(HashEmbedder::default().embed(query_text).unwrap());
    let executor = HybridExecutor::from_config(store.clone(), &RetrievalConfig::default());
    let results = executor.search(&query, 3).unwrap();

    assert!(!results.is_empty() && results.len() <= 3);
    assert_eq!(results[0].chunk_id(), "ch4");
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn community_descent_only_returns_mentioned_chunks() {
    let store = acme_store();
    let hierarchy = HierarchyEngine::new(
        store.clone(),
        HierarchyConfig { enrichment_backoff_ms: 0, ..HierarchyConfig::default() },
        Some(Arc::new(JoinSummarizer)),
        Some(Arc::new(HashEmbedder::default())),
    );
    let summary = hierarchy.rebuild().unwrap();
    assert!(summary.total_communities > 0);

    let config = RetrievalConfig::default();
    let executor = CommunityExecutor::from_config(store.clone(), hierarchy.handle(), &config);
    let text = "overview of the anvil industry";
    let query = QueryContext::new(text).with_embedding(HashEmbedder::default().embed(text).unwrap());
    let results = executor.search(&query, 10).unwrap();

    assert!(!results.is_empty());
    assert!(!ids(&results).contains(&"ch6"));
    assert!(results.iter().all(|r| r.strategy == StrategyTag::CommunityBased));
}

#[test]
fn community_search_without_hierarchy_is_empty() {
    let store = acme_store();
    let executor = CommunityExecutor::from_config(store, HierarchyHandle::default(), &RetrievalConfig::default());
    let query = QueryContext::new("overview").with_embedding(vec![1.0; 64]);
    assert!(executor.search(&query, 10).unwrap().is_empty());
}

#[test]
fn executors_needing_embeddings_report_it() {
    let store = acme_store();
    let registry = default_registry(store, HierarchyHandle::default(), &RetrievalConfig::default());
    let query = QueryContext::new("no embedding here");
    for tag in [StrategyTag::Vector, StrategyTag::CommunityBased] {
        let err = registry.get(tag).unwrap().search(&query, 5).unwrap_err();
        assert!(matches!(err, StrataError::RetrievalError(RetrievalError::EmbeddingUnavailable { .. })));
    }
}

// --- Engine ---

#[tokio::test]
async fn comparative_query_fans_out_and_fuses() {
    let store = acme_store();
    let engine = acme_engine(store, RetrievalConfig::default()).with_classifier(Arc::new(StaticClassifier(
        classification(QueryType::Comparative, &["Acme Corp", "Rival Inc"]),
    )));

    let results = engine.search(SearchRequest::new("Compare Acme Corp and Rival Inc").top_k(4)).await.unwrap();
    assert!(!results.is_empty() && results.len() <= 4);

    let unique: std::collections::HashSet<&str> = ids(&results).into_iter().collect();
    assert_eq!(unique.len(), results.len());
    let ch4 = results.iter().find(|r| r.chunk_id() == "ch4").expect("chunk naming both companies");
    assert!(ch4.contributing_strategies.contains(&StrategyTag::EntityAware));
    assert!(results.iter().all(|r| r.rerank_score.is_some()));

    let observability = engine.observability();
    let observability = observability.lock().unwrap();
    let entry = observability.query_log.last().unwrap();
    assert_eq!(
        entry.strategies,
        vec![StrategyTag::Hybrid, StrategyTag::EntityAware, StrategyTag::GraphTraversal]
    );
    assert!(entry.failed_strategies.is_empty());
    assert_eq!(entry.result_count, results.len());
}

#[tokio::test]
async fn missing_path_still_returns_other_strategies() {
    let store = acme_store();
    let engine = acme_engine(store, RetrievalConfig::default()).with_classifier(Arc::new(StaticClassifier(
        classification(QueryType::Analytical, &["Jane Doe", "John Roe"]),
    )));

    let request = SearchRequest::new("How is Jane Doe connected to John Roe?")
        .hint(vec![StrategyTag::GraphTraversal, StrategyTag::EntityAware]);
    let results = engine.search(request).await.unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.strategy == StrategyTag::EntityAware));

    let observability = engine.observability();
    let observability = observability.lock().unwrap();
    let traversal = observability.metrics.retrieval.strategy(StrategyTag::GraphTraversal);
    assert_eq!((traversal.invocations, traversal.results, traversal.failures), (1, 0, 0));
}

#[tokio::test]
async fn panics_errors_and_timeouts_become_empty_results() {
    let store = acme_store();
    let config = RetrievalConfig { query_timeout_ms: 150, ..RetrievalConfig::default() };
    let vector = CountingExecutor::new(StrategyTag::Vector);
    let registry = StrategyRegistry::new()
        .with(vector.clone())
        .with(Arc::new(ErroringExecutor))
        .with(Arc::new(PanickingExecutor))
        .with(Arc::new(SlowExecutor(Duration::from_millis(600))));
    let engine = RetrievalEngine::new(store, registry, config, RerankConfig::default());

    let request = SearchRequest::new("anything at all will do").hint(StrategyTag::ALL.to_vec());
    let results = engine.search(request).await.unwrap();

    assert_eq!(ids(&results), vec!["counted-vector"]);
    assert_eq!(vector.calls.load(Ordering::SeqCst), 1);

    let observability = engine.observability();
    let observability = observability.lock().unwrap();
    assert_eq!(
        observability.query_log.last().unwrap().failed_strategies,
        vec![StrategyTag::Hybrid, StrategyTag::GraphTraversal, StrategyTag::CommunityBased]
    );
    let metrics = &observability.metrics.retrieval;
    assert_eq!(metrics.strategy(StrategyTag::GraphTraversal).failures, 1);
    assert_eq!(metrics.strategy(StrategyTag::Hybrid).failures, 1);
    assert_eq!(metrics.strategy(StrategyTag::CommunityBased).timeouts, 1);
}

#[tokio::test]
async fn invalid_requests_are_rejected_before_any_executor_runs() {
    let store = acme_store();
    let vector = CountingExecutor::new(StrategyTag::Vector);
    let engine = RetrievalEngine::new(
        store,
        StrategyRegistry::new().with(vector.clone()),
        RetrievalConfig::default(),
        RerankConfig::default(),
    );

    for request in [
        SearchRequest::new("a perfectly fine query").top_k(0),
        SearchRequest::new("a perfectly fine query").top_k(101),
        SearchRequest::new("   "),
    ] {
        let err = engine.search(request).await.unwrap_err();
        assert!(matches!(err, StrataError::RetrievalError(RetrievalError::InvalidQuery { .. })));
    }
    assert_eq!(vector.calls.load(Ordering::SeqCst), 0);

    let observability = engine.observability();
    let observability = observability.lock().unwrap();
    assert_eq!(observability.metrics.retrieval.rejected_queries, 3);
    assert_eq!(observability.query_log.count(), 0);
}

#[tokio::test]
async fn hint_for_unregistered_executor_falls_back_to_vector() {
    let store = acme_store();
    let vector = CountingExecutor::new(StrategyTag::Vector);
    let engine = RetrievalEngine::new(
        store,
        StrategyRegistry::new().with(vector.clone()),
        RetrievalConfig::default(),
        RerankConfig::default(),
    );

    let results = engine
        .search(SearchRequest::new("who founded the company?").hint(vec![StrategyTag::GraphTraversal]))
        .await
        .unwrap();
    assert_eq!(ids(&results), vec!["counted-vector"]);
    assert_eq!(vector.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn short_and_unclassified_queries_use_vector_only() {
    let store = acme_store();
    let engine = acme_engine(store, RetrievalConfig::default());

    for query in ["Acme?", "what happened with the anvil makers"] {
        engine.search(SearchRequest::new(query)).await.unwrap();
        let observability = engine.observability();
        let strategies = observability.lock().unwrap().query_log.last().unwrap().strategies.clone();
        assert_eq!(strategies, vec![StrategyTag::Vector], "{query}");
    }
}

#[tokio::test]
async fn unmatched_query_returns_empty_list() {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let engine = acme_engine(store, RetrievalConfig::default());
    let results = engine.search(SearchRequest::new("nothing is stored anywhere")).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn rerank_top_n_caps_a_larger_top_k() {
    let store = acme_store();
    let config = RetrievalConfig::default();
    let registry = default_registry(store.clone(), HierarchyHandle::default(), &config);
    let engine = RetrievalEngine::new(store, registry, config, RerankConfig { top_n: 2, ..RerankConfig::default() })
        .with_embedder(Arc::new(HashEmbedder::default()));

    let request = SearchRequest::new("What does Acme Corp make?").hint(vec![StrategyTag::Vector]);
    let results = engine.search(request.clone().top_k(5)).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(engine.search(request.top_k(1)).await.unwrap().len(), 1);
}
