//! HierarchyEngine: rebuild pipeline with a single-rebuild guard and
//! snapshot swap.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use strata_core::config::HierarchyConfig;
use strata_core::errors::HierarchyError;
use strata_core::models::{Entity, RebuildSummary};
use strata_core::traits::{IEmbeddingProvider, IGraphStore, ISummaryProvider};
use strata_core::StrataResult;

use crate::enrichment::Enricher;
use crate::hierarchy::{Hierarchy, HierarchyBuilder};
use crate::snapshot::HierarchyHandle;

/// Releases the rebuild flag on every exit path, including panics.
struct RebuildGuard<'a>(&'a AtomicBool);

impl<'a> RebuildGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> StrataResult<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| HierarchyError::RebuildInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for RebuildGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owns hierarchy construction for one graph store.
///
/// Queries read [`HierarchyEngine::handle`]; a rebuild replaces the snapshot only
/// after the new hierarchy has been persisted, so readers see either the whole
/// old hierarchy or the whole new one.
pub struct HierarchyEngine {
    store: Arc<dyn IGraphStore>,
    builder: HierarchyBuilder,
    enricher: Enricher,
    snapshot: HierarchyHandle,
    /// Guard: only one rebuild can run at a time.
    is_rebuilding: Arc<AtomicBool>,
}

impl HierarchyEngine {
    pub fn new(
        store: Arc<dyn IGraphStore>,
        config: HierarchyConfig,
        summarizer: Option<Arc<dyn ISummaryProvider>>,
        embedder: Option<Arc<dyn IEmbeddingProvider>>,
    ) -> Self {
        Self {
            store,
            enricher: Enricher::new(&config, summarizer, embedder),
            builder: HierarchyBuilder::new(config),
            snapshot: HierarchyHandle::default(),
            is_rebuilding: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> HierarchyHandle {
        self.snapshot.clone()
    }

    pub fn current(&self) -> Arc<Hierarchy> {
        self.snapshot.load()
    }

    pub fn is_rebuilding(&self) -> bool {
        self.is_rebuilding.load(Ordering::Relaxed)
    }

    /// Load the persisted hierarchy into the snapshot. Returns the community count.
    pub fn hydrate(&self) -> StrataResult<usize> {
        let hierarchy = Hierarchy::from_communities(self.store.get_all_communities()?)?;
        let count = hierarchy.total_communities();
        self.snapshot.swap(Arc::new(hierarchy));
        info!(communities = count, "hierarchy hydrated from store");
        Ok(count)
    }

    /// Rebuild every level from the current entity graph.
    ///
    /// Fails with [`HierarchyError::RebuildInProgress`] when another rebuild holds
    /// the guard. On any error the previous hierarchy stays in place, both in the
    /// store and in the snapshot.
    pub fn rebuild(&self) -> StrataResult<RebuildSummary> {
        let _guard = RebuildGuard::acquire(&self.is_rebuilding).inspect_err(|_| {
            warn!("rebuild requested while another rebuild is running");
        })?;

        let run_id = uuid::Uuid::new_v4().to_string();
        let _span = strata_observability::rebuild_span!(run_id).entered();
        let started = Instant::now();

        let entities = self.store.get_entities()?;
        let relationships = self.store.get_relationships()?;
        info!(entities = entities.len(), relationships = relationships.len(), "rebuild started");

        let outcome = self.builder.build(&entities, &relationships)?;
        let mut hierarchy = outcome.hierarchy;

        let by_id: HashMap<String, Entity> = entities.into_iter().map(|e| (e.id.clone(), e)).collect();
        let report = self.enricher.enrich(&mut hierarchy, &by_id);

        self.store.replace_hierarchy(&hierarchy.to_records())?;

        let summary = RebuildSummary {
            run_id,
            levels_created: hierarchy.level_count(),
            total_communities: hierarchy.total_communities(),
            communities_per_level: hierarchy.levels().iter().map(|l| l.len()).collect(),
            modularity_per_level: outcome.modularity_per_level,
            summaries_failed: report.summaries_failed,
            embeddings_failed: report.embeddings_failed,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        self.snapshot.swap(Arc::new(hierarchy));

        info!(
            levels = summary.levels_created,
            communities = summary.total_communities,
            summaries_failed = summary.summaries_failed,
            embeddings_failed = summary.embeddings_failed,
            duration_ms = summary.duration_ms,
            "rebuild complete"
        );
        Ok(summary)
    }
}
