//! Chunks around the entities the query names.
//!
//! Each resolved query entity contributes evidence to the chunks that mention
//! it directly (the mention salience) and, up to `max_hops` relationship hops
//! out, to chunks mentioning its neighbors (salience times the edge weights
//! along the way, decayed by `hop_decay` per hop). A chunk's score is its
//! strongest evidence across query entities, boosted by `co_occurrence_boost`
//! for every query entity beyond the first that it connects to.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use strata_core::config::RetrievalConfig;
use strata_core::models::{Chunk, QueryContext, SearchResult, StrategyTag};
use strata_core::traits::{IGraphStore, IStrategyExecutor};
use strata_core::StrataResult;

use super::finish;

pub struct EntityAwareExecutor {
    store: Arc<dyn IGraphStore>,
    max_hops: usize,
    hop_decay: f64,
    co_occurrence_boost: f64,
}

impl EntityAwareExecutor {
    pub fn new(store: Arc<dyn IGraphStore>, max_hops: usize, hop_decay: f64, co_occurrence_boost: f64) -> Self {
        Self {
            store,
            max_hops,
            hop_decay,
            co_occurrence_boost,
        }
    }

    pub fn from_config(store: Arc<dyn IGraphStore>, config: &RetrievalConfig) -> Self {
        Self::new(store, config.max_hops, config.hop_decay, config.co_occurrence_boost)
    }

    /// Best evidence per chunk for one query entity.
    fn evidence_for(
        &self,
        entity_id: &str,
        as_of: Option<DateTime<Utc>>,
        chunks: &mut HashMap<String, Chunk>,
    ) -> StrataResult<HashMap<String, f64>> {
        let mut best: HashMap<String, f64> = HashMap::new();
        let mut record = |chunk: Chunk, evidence: f64, chunks: &mut HashMap<String, Chunk>| {
            let slot = best.entry(chunk.id.clone()).or_insert(f64::NEG_INFINITY);
            if evidence > *slot {
                *slot = evidence;
            }
            chunks.entry(chunk.id.clone()).or_insert(chunk);
        };

        for (chunk, salience) in self.store.get_chunks_mentioning_entity(entity_id)? {
            record(chunk, salience, chunks);
        }

        // BFS over relationships; each entity is reached once, at its
        // shortest hop distance, with the heaviest path found at that distance.
        let mut visited: HashSet<String> = HashSet::from([entity_id.to_string()]);
        let mut frontier: BTreeMap<String, f64> = BTreeMap::from([(entity_id.to_string(), 1.0)]);
        for hop in 1..=self.max_hops {
            let mut next: BTreeMap<String, f64> = BTreeMap::new();
            for (current, path_weight) in &frontier {
                for rel in self.store.get_relationships_for_entity(current)? {
                    if as_of.is_some_and(|at| !rel.is_active_at(at)) {
                        continue;
                    }
                    let Some(neighbor) = rel.other_end(current) else { continue };
                    if visited.contains(neighbor) {
                        continue;
                    }
                    let weight = path_weight * rel.weight;
                    let slot = next.entry(neighbor.to_string()).or_insert(0.0);
                    if weight > *slot {
                        *slot = weight;
                    }
                }
            }
            if next.is_empty() {
                break;
            }

            let decay = self.hop_decay.powi(hop as i32);
            for (neighbor, path_weight) in &next {
                visited.insert(neighbor.clone());
                for (chunk, salience) in self.store.get_chunks_mentioning_entity(neighbor)? {
                    record(chunk, salience * path_weight * decay, chunks);
                }
            }
            frontier = next;
        }

        Ok(best)
    }
}

/// Score of a chunk given its best evidence for each query entity it connects
/// to. Never decreases when evidence for another entity is added, as long as
/// `boost >= 0` and evidence is non-negative.
pub fn co_occurrence_score(evidence: &[f64], boost: f64) -> f64 {
    if evidence.is_empty() {
        return 0.0;
    }
    let strongest = evidence.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    strongest * (1.0 + boost * (evidence.len() as f64 - 1.0))
}

impl IStrategyExecutor for EntityAwareExecutor {
    fn tag(&self) -> StrategyTag {
        StrategyTag::EntityAware
    }

    fn search(&self, query: &QueryContext, top_k: usize) -> StrataResult<Vec<SearchResult>> {
        if query.entities.is_empty() {
            return Ok(Vec::new());
        }

        let mut chunks: HashMap<String, Chunk> = HashMap::new();
        let mut per_chunk: HashMap<String, Vec<f64>> = HashMap::new();
        for entity in &query.entities {
            for (chunk_id, evidence) in self.evidence_for(&entity.id, query.as_of, &mut chunks)? {
                per_chunk.entry(chunk_id).or_default().push(evidence);
            }
        }

        let results: Vec<SearchResult> = per_chunk
            .into_iter()
            .filter_map(|(chunk_id, evidence)| {
                let score = co_occurrence_score(&evidence, self.co_occurrence_boost);
                chunks
                    .remove(&chunk_id)
                    .map(|chunk| SearchResult::new(chunk, score, StrategyTag::EntityAware))
            })
            .collect();

        debug!(entities = query.entities.len(), candidates = results.len(), "entity-aware evidence gathered");
        Ok(finish(results, top_k))
    }
}
