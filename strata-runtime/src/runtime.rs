//! StrataRuntime: owns every engine plus the shared observability sink.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use strata_community::{Hierarchy, HierarchyEngine};
use strata_core::errors::HierarchyError;
use strata_core::traits::{IEmbeddingProvider, IQueryClassifier, IRelevanceScorer, ISummaryProvider};
use strata_core::{RebuildSummary, SearchRequest, SearchResult, StrataConfig, StrataError, StrataResult};
use strata_observability::tracing_setup::init_tracing;
use strata_observability::{ObservabilityEngine, QueryLogEntry};
use strata_retrieval::strategies::default_registry;
use strata_retrieval::{HeuristicQueryClassifier, RetrievalEngine};
use strata_storage::StorageEngine;

/// Options for building the runtime.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// Path to the SQLite database. If None, uses in-memory.
    pub db_path: Option<PathBuf>,
    /// TOML configuration string. If None, uses defaults.
    pub config_toml: Option<String>,
}

/// External services. Every slot is optional:
/// - no embedder: vector, hybrid-vector, and community search return nothing;
/// - no summarizer: communities keep a null summary;
/// - no classifier: the built-in [`HeuristicQueryClassifier`] is used;
/// - no scorer: the fused score is the relevance.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub embedder: Option<Arc<dyn IEmbeddingProvider>>,
    pub summarizer: Option<Arc<dyn ISummaryProvider>>,
    pub classifier: Option<Arc<dyn IQueryClassifier>>,
    pub scorer: Option<Arc<dyn IRelevanceScorer>>,
}

pub struct StrataRuntime {
    pub storage: Arc<StorageEngine>,
    pub hierarchy: HierarchyEngine,
    pub retrieval: RetrievalEngine,
    pub observability: Arc<Mutex<ObservabilityEngine>>,
    pub config: StrataConfig,
}

impl StrataRuntime {
    pub fn new(opts: RuntimeOptions, collaborators: Collaborators) -> StrataResult<Self> {
        let config = match &opts.config_toml {
            Some(toml_str) => StrataConfig::from_toml(toml_str)?,
            None => StrataConfig::default(),
        };
        init_tracing(&config.observability.log_level);

        let storage = Arc::new(match &opts.db_path {
            Some(path) => StorageEngine::open(path, &config.storage)?,
            None => StorageEngine::open_in_memory()?,
        });

        let hierarchy = HierarchyEngine::new(
            storage.clone(),
            config.hierarchy.clone(),
            collaborators.summarizer.clone(),
            collaborators.embedder.clone(),
        );

        let observability = Arc::new(Mutex::new(ObservabilityEngine::new(&config.observability)));
        let registry = default_registry(storage.clone(), hierarchy.handle(), &config.retrieval);
        let classifier = collaborators
            .classifier
            .clone()
            .unwrap_or_else(|| Arc::new(HeuristicQueryClassifier::new()));

        let mut retrieval = RetrievalEngine::new(
            storage.clone(),
            registry,
            config.retrieval.clone(),
            config.rerank.clone(),
        )
        .with_classifier(classifier)
        .with_observability(observability.clone());
        if let Some(embedder) = collaborators.embedder {
            retrieval = retrieval.with_embedder(embedder);
        }
        if let Some(scorer) = collaborators.scorer {
            retrieval = retrieval.with_scorer(scorer);
        }

        info!(
            persistent = opts.db_path.is_some(),
            strategies = retrieval.registry().len(),
            "strata runtime ready"
        );

        Ok(Self {
            storage,
            hierarchy,
            retrieval,
            observability,
            config,
        })
    }

    /// Rebuild the community hierarchy from the current entity graph.
    pub fn rebuild_hierarchy(&self) -> StrataResult<RebuildSummary> {
        let result = self.hierarchy.rebuild();
        let mut observability = self.lock_observability();
        match &result {
            Ok(summary) => observability.metrics.rebuild.record_rebuild(summary),
            Err(StrataError::HierarchyError(HierarchyError::RebuildInProgress)) => {
                observability.metrics.rebuild.record_rejected()
            }
            Err(_) => observability.metrics.rebuild.record_failure(),
        }
        result
    }

    /// Load a previously persisted hierarchy. Returns the community count.
    pub fn hydrate(&self) -> StrataResult<usize> {
        self.hierarchy.hydrate()
    }

    pub async fn search(&self, request: SearchRequest) -> StrataResult<Vec<SearchResult>> {
        self.retrieval.search(request).await
    }

    /// The hierarchy snapshot queries currently read.
    pub fn current_hierarchy(&self) -> Arc<Hierarchy> {
        self.hierarchy.current()
    }

    /// Logged queries, oldest first.
    pub fn query_log(&self) -> Vec<QueryLogEntry> {
        self.lock_observability().query_log.entries().cloned().collect()
    }

    /// Metrics and query log aggregates as JSON.
    pub fn metrics(&self) -> StrataResult<serde_json::Value> {
        self.lock_observability().metrics_snapshot()
    }

    fn lock_observability(&self) -> std::sync::MutexGuard<'_, ObservabilityEngine> {
        self.observability.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
