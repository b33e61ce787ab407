//! Top-down descent through the community hierarchy.
//!
//! Starts at `community_start_level` (the top level by default), keeps the
//! `community_beam_width` communities closest to the query, and repeats on
//! their children until level 1 or `max_descent_depth` levels below the start.
//! Chunks mentioning the leaf entities of the surviving communities are ranked
//! by cosine similarity to the query.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::debug;

use strata_community::{Hierarchy, HierarchyHandle};
use strata_core::config::RetrievalConfig;
use strata_core::models::{Chunk, Community, QueryContext, SearchResult, StrategyTag};
use strata_core::similarity::cosine_similarity;
use strata_core::traits::{IGraphStore, IStrategyExecutor};
use strata_core::StrataResult;

use super::{finish, require_embedding};

pub struct CommunityExecutor {
    store: Arc<dyn IGraphStore>,
    hierarchy: HierarchyHandle,
    start_level: Option<u32>,
    beam_width: usize,
    max_descent_depth: usize,
}

impl CommunityExecutor {
    pub fn from_config(store: Arc<dyn IGraphStore>, hierarchy: HierarchyHandle, config: &RetrievalConfig) -> Self {
        Self {
            store,
            hierarchy,
            start_level: config.community_start_level,
            beam_width: config.community_beam_width.max(1),
            max_descent_depth: config.max_descent_depth,
        }
    }

    /// Ids of the communities left after descent.
    pub fn descend(&self, hierarchy: &Hierarchy, embedding: &[f32]) -> Vec<String> {
        let top = hierarchy.level_count();
        if top == 0 {
            return Vec::new();
        }
        let start = self.start_level.unwrap_or(top).clamp(1, top);
        let Some(level) = hierarchy.level(start) else {
            return Vec::new();
        };

        let mut beam = self.keep_best(level.communities.iter().collect(), embedding);
        let mut depth = 0;
        let mut current_level = start;
        while current_level > 1 && depth < self.max_descent_depth {
            let children: Vec<&Community> = beam.iter().flat_map(|c| hierarchy.children(&c.id)).collect();
            if children.is_empty() {
                break;
            }
            beam = self.keep_best(children, embedding);
            current_level -= 1;
            depth += 1;
        }
        debug!(start, stopped_at = current_level, kept = beam.len(), "community descent complete");
        beam.into_iter().map(|c| c.id.clone()).collect()
    }

    /// Embedded communities by similarity, then the rest, each group tied by id.
    fn keep_best<'a>(&self, mut candidates: Vec<&'a Community>, embedding: &[f32]) -> Vec<&'a Community> {
        let score = |c: &Community| c.embedding.as_deref().map(|e| cosine_similarity(e, embedding));
        candidates.sort_by(|a, b| match (score(a), score(b)) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal).then_with(|| a.id.cmp(&b.id)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });
        candidates.truncate(self.beam_width);
        candidates
    }
}

impl IStrategyExecutor for CommunityExecutor {
    fn tag(&self) -> StrategyTag {
        StrategyTag::CommunityBased
    }

    fn search(&self, query: &QueryContext, top_k: usize) -> StrataResult<Vec<SearchResult>> {
        let embedding = require_embedding(query, self.tag())?;
        let snapshot = self.hierarchy.load();
        if snapshot.is_empty() {
            return Ok(Vec::new());
        }

        let entities: BTreeSet<String> = self
            .descend(&snapshot, embedding)
            .iter()
            .flat_map(|id| snapshot.leaf_entity_ids(id))
            .collect();

        let mut chunks: HashMap<String, Chunk> = HashMap::new();
        for entity_id in &entities {
            for (chunk, _) in self.store.get_chunks_mentioning_entity(entity_id)? {
                chunks.entry(chunk.id.clone()).or_insert(chunk);
            }
        }

        let results = chunks
            .into_values()
            .map(|chunk| {
                let similarity = chunk.embedding.as_deref().map_or(0.0, |e| cosine_similarity(e, embedding));
                SearchResult::new(chunk, similarity, StrategyTag::CommunityBased)
            })
            .collect();
        Ok(finish(results, top_k))
    }
}
