//! RetrievalEngine: validate → prepare → select → fan out → fuse → rerank.
//!
//! Preparation (classification, query embedding, entity resolution) runs once
//! per query on the blocking pool and produces the shared [`QueryContext`].
//! Each selected executor then runs as its own blocking task. The fuser waits
//! for all of them up to the per-query deadline; an executor that errors,
//! panics, or misses the deadline contributes nothing.

use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn, Instrument};

use strata_core::config::{RerankConfig, RetrievalConfig};
use strata_core::errors::{RetrievalError, StrataError};
use strata_core::models::{QueryContext, SearchRequest, SearchResult, StrategyTag};
use strata_core::traits::{IEmbeddingProvider, IGraphStore, IQueryClassifier, IRelevanceScorer};
use strata_core::StrataResult;
use strata_observability::query_log::QueryLogEntry;
use strata_observability::{search_span, strategy_span, ObservabilityEngine};

use crate::fusion::ResultFuser;
use crate::ranking::Reranker;
use crate::resolution::EntityResolver;
use crate::selection::{StrategyRegistry, StrategySelector};

/// Everything needed to build a [`QueryContext`]. Cheap to clone into a
/// blocking task.
#[derive(Clone)]
struct QueryPreparer {
    classifier: Option<Arc<dyn IQueryClassifier>>,
    embedder: Option<Arc<dyn IEmbeddingProvider>>,
    resolver: Arc<EntityResolver>,
}

impl QueryPreparer {
    /// Collaborator failures degrade the context instead of failing the query.
    fn prepare(&self, request: &SearchRequest) -> QueryContext {
        let text = request.query.trim();
        let mut context = QueryContext::new(text);
        context.as_of = request.as_of;

        if let Some(classifier) = &self.classifier {
            match classifier.classify(text) {
                Ok(classification) => context.classification = Some(classification),
                Err(e) => warn!(error = %e, "query classification failed, continuing unclassified"),
            }
        }

        if let Some(embedder) = &self.embedder {
            match embedder.embed(text) {
                Ok(embedding) => context.embedding = Some(embedding),
                Err(e) => warn!(provider = embedder.name(), error = %e, "query embedding failed"),
            }
        }

        match self
            .resolver
            .resolve(text, context.classification.as_ref(), context.embedding.as_deref())
        {
            Ok(entities) => context.entities = entities,
            Err(e) => warn!(error = %e, "entity resolution failed"),
        }

        context
    }
}

/// How the executors of one query finished.
#[derive(Debug, Default)]
struct FanOut {
    results: Vec<SearchResult>,
    failed: Vec<StrategyTag>,
}

pub struct RetrievalEngine {
    config: RetrievalConfig,
    registry: StrategyRegistry,
    selector: StrategySelector,
    preparer: QueryPreparer,
    fuser: ResultFuser,
    rerank: RerankConfig,
    reranker: Arc<Reranker>,
    observability: Arc<Mutex<ObservabilityEngine>>,
}

impl RetrievalEngine {
    pub fn new(
        store: Arc<dyn IGraphStore>,
        registry: StrategyRegistry,
        config: RetrievalConfig,
        rerank: RerankConfig,
    ) -> Self {
        Self {
            selector: StrategySelector::new(config.min_query_chars),
            preparer: QueryPreparer {
                classifier: None,
                embedder: None,
                resolver: Arc::new(EntityResolver::new(store, config.entity_match_threshold)),
            },
            fuser: ResultFuser::new(config.max_candidates),
            reranker: Arc::new(Reranker::new(rerank.clone(), None)),
            rerank,
            observability: Arc::new(Mutex::new(ObservabilityEngine::default())),
            registry,
            config,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn IQueryClassifier>) -> Self {
        self.preparer.classifier = Some(classifier);
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn IEmbeddingProvider>) -> Self {
        self.preparer.embedder = Some(embedder);
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn IRelevanceScorer>) -> Self {
        self.reranker = Arc::new(Reranker::new(self.rerank.clone(), Some(scorer)));
        self
    }

    /// Share a query log and metrics sink with the caller.
    pub fn with_observability(mut self, observability: Arc<Mutex<ObservabilityEngine>>) -> Self {
        self.observability = observability;
        self
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn observability(&self) -> Arc<Mutex<ObservabilityEngine>> {
        self.observability.clone()
    }

    /// Reject a request before any retrieval work. Returns the effective top_k.
    pub fn validate(&self, request: &SearchRequest) -> StrataResult<usize> {
        let invalid = |reason: String| -> StrataError { RetrievalError::InvalidQuery { reason }.into() };

        if request.query.trim().is_empty() {
            return Err(invalid("query text is empty".into()));
        }
        let top_k = request.top_k.unwrap_or(self.config.default_top_k);
        if top_k == 0 {
            return Err(invalid("top_k must be at least 1".into()));
        }
        if top_k > self.config.max_top_k {
            return Err(invalid(format!(
                "top_k {top_k} exceeds the maximum of {}",
                self.config.max_top_k
            )));
        }
        Ok(top_k)
    }

    /// Run one query end to end. Only an invalid request is an error; a query
    /// nothing matches returns an empty list.
    pub async fn search(&self, request: SearchRequest) -> StrataResult<Vec<SearchResult>> {
        let top_k = match self.validate(&request) {
            Ok(top_k) => top_k,
            Err(e) => {
                self.lock_observability().metrics.retrieval.record_rejected();
                return Err(e);
            }
        };

        let span = search_span!(request.query, top_k);
        self.run(request, top_k).instrument(span).await
    }

    async fn run(&self, request: SearchRequest, top_k: usize) -> StrataResult<Vec<SearchResult>> {
        let started = Instant::now();

        let preparer = self.preparer.clone();
        let prepared_request = request.clone();
        let context = tokio::task::spawn_blocking(move || preparer.prepare(&prepared_request))
            .await
            .map_err(|e| StrataError::ConcurrencyError(format!("query preparation task failed: {e}")))?;

        let plan = self.selector.plan(
            &context.text,
            context.classification.as_ref(),
            context.entities.len(),
            request.strategy_hint.as_deref(),
            &self.registry,
        );

        let fan_out = self.fan_out(Arc::new(context), &plan.tags, top_k).await;
        let candidates = self.fuser.fuse(fan_out.results);
        let candidate_count = candidates.len();

        let limit = top_k.min(self.rerank.top_n);
        if limit < top_k {
            info!(top_k, top_n = self.rerank.top_n, "rerank top_n caps the requested top_k");
        }

        let reranker = self.reranker.clone();
        let query = request.query.trim().to_string();
        let mut results = tokio::task::spawn_blocking(move || reranker.rerank(&query, candidates, top_k))
            .await
            .map_err(|e| StrataError::ConcurrencyError(format!("rerank task failed: {e}")))?;
        results.truncate(limit);

        let latency = started.elapsed();
        info!(
            strategies = ?plan.tags,
            failed = ?fan_out.failed,
            candidates = candidate_count,
            limit,
            results = results.len(),
            latency_ms = latency.as_millis() as u64,
            "search complete"
        );

        let mut observability = self.lock_observability();
        observability.metrics.retrieval.record_query(results.len());
        observability.query_log.record(QueryLogEntry::new(
            request.query.trim(),
            plan.tags.clone(),
            fan_out.failed,
            latency,
            results.len(),
        ));

        Ok(results)
    }

    /// Dispatch every executor in `tags` and collect what arrives before the
    /// deadline.
    async fn fan_out(&self, context: Arc<QueryContext>, tags: &[StrategyTag], top_k: usize) -> FanOut {
        let deadline = Instant::now() + Duration::from_millis(self.config.query_timeout_ms);
        let mut tasks = JoinSet::new();
        let mut pending: BTreeSet<StrategyTag> = BTreeSet::new();
        let mut outcome = FanOut::default();

        for &tag in tags {
            let Some(executor) = self.registry.get(tag) else {
                warn!(strategy = %tag, "no executor registered, skipping");
                continue;
            };
            let context = context.clone();
            pending.insert(tag);
            tasks.spawn_blocking(move || {
                let _span = strategy_span!(tag).entered();
                let result = panic::catch_unwind(AssertUnwindSafe(|| executor.search(&context, top_k)))
                    .unwrap_or_else(|payload| {
                        Err(RetrievalError::ExecutorFailed {
                            strategy: tag.to_string(),
                            reason: format!("panicked: {}", panic_message(payload.as_ref())),
                        }
                        .into())
                    });
                (tag, result)
            });
        }

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((tag, result)))) => {
                    pending.remove(&tag);
                    let mut observability = self.lock_observability();
                    match result {
                        Ok(results) => {
                            debug!(strategy = %tag, results = results.len(), "executor finished");
                            observability.metrics.retrieval.record_strategy_success(tag, results.len());
                            outcome.results.extend(results);
                        }
                        Err(e) => {
                            warn!(strategy = %tag, error = %e, "executor failed, treating as empty");
                            observability.metrics.retrieval.record_strategy_failure(tag);
                            outcome.failed.push(tag);
                        }
                    }
                }
                Ok(Some(Err(e))) => warn!(error = %e, "executor task did not complete"),
                Ok(None) => break,
                Err(_) => {
                    let mut observability = self.lock_observability();
                    for &tag in &pending {
                        warn!(strategy = %tag, timeout_ms = self.config.query_timeout_ms, "executor timed out, treating as empty");
                        observability.metrics.retrieval.record_strategy_timeout(tag);
                        outcome.failed.push(tag);
                    }
                    tasks.abort_all();
                    break;
                }
            }
        }

        outcome.failed.sort();
        outcome
    }

    fn lock_observability(&self) -> std::sync::MutexGuard<'_, ObservabilityEngine> {
        self.observability.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
