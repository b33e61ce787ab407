//! Shortest relationship paths between pairs of query entities.
//!
//! The neighborhood of every query entity is loaded by bounded BFS into a
//! petgraph `StableGraph`; paths are found with A* at unit cost, so the fewest
//! hops win. Evidence for a hop is any chunk mentioning both endpoints.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use tracing::debug;

use strata_core::models::{Chunk, PathHop, QueryContext, Relationship, SearchResult, StrategyTag};
use strata_core::traits::{IGraphStore, IStrategyExecutor};
use strata_core::StrataResult;

use super::finish;

/// Multiplier applied to evidence reached through a relation type.
pub fn relation_boost(relationship_type: &str) -> f64 {
    match relationship_type {
        "elaborates" => 1.2,
        "supports" => 1.15,
        "contradicts" => 0.9,
        _ => 1.0,
    }
}

/// Entity neighborhood with id lookup.
pub struct IndexedGraph {
    pub graph: StableUnGraph<String, Relationship>,
    pub node_index: HashMap<String, NodeIndex>,
}

impl IndexedGraph {
    pub fn new() -> Self {
        Self {
            graph: StableUnGraph::default(),
            node_index: HashMap::new(),
        }
    }

    pub fn ensure_node(&mut self, entity_id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(entity_id) {
            return idx;
        }
        let idx = self.graph.add_node(entity_id.to_string());
        self.node_index.insert(entity_id.to_string(), idx);
        idx
    }

    pub fn get_node(&self, entity_id: &str) -> Option<NodeIndex> {
        self.node_index.get(entity_id).copied()
    }

    /// Heaviest relationship directly between `a` and `b`.
    pub fn strongest_edge(&self, a: NodeIndex, b: NodeIndex) -> Option<&Relationship> {
        self.graph
            .edges(a)
            .filter(|e| (e.source() == a && e.target() == b) || (e.source() == b && e.target() == a))
            .map(|e| e.weight())
            .max_by(|x, y| x.weight.total_cmp(&y.weight).then_with(|| y.relationship_type.cmp(&x.relationship_type)))
    }

    /// Fewest-hop path from `from` to `to`, as node ids.
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let start = self.get_node(from)?;
        let goal = self.get_node(to)?;
        let (_, nodes) = petgraph::algo::astar(&self.graph, start, |n| n == goal, |_| 1.0, |_| 0.0)?;
        nodes
            .into_iter()
            .map(|idx| self.graph.node_weight(idx).cloned())
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for IndexedGraph {
    fn default() -> Self {
        Self::new()
    }
}

pub struct GraphTraversalExecutor {
    store: Arc<dyn IGraphStore>,
    max_hops: usize,
}

impl GraphTraversalExecutor {
    pub fn new(store: Arc<dyn IGraphStore>, max_hops: usize) -> Self {
        Self { store, max_hops }
    }

    /// Load everything within `max_hops` of each seed.
    fn neighborhood(&self, seeds: &[&str], as_of: Option<DateTime<Utc>>) -> StrataResult<IndexedGraph> {
        let mut graph = IndexedGraph::new();
        let mut seen_edges: HashSet<(String, String, String)> = HashSet::new();

        for seed in seeds {
            graph.ensure_node(seed);
            let mut visited: HashSet<String> = HashSet::from([seed.to_string()]);
            let mut queue: VecDeque<(String, usize)> = VecDeque::from([(seed.to_string(), 0)]);

            while let Some((current, depth)) = queue.pop_front() {
                if depth >= self.max_hops {
                    continue;
                }
                for rel in self.store.get_relationships_for_entity(&current)? {
                    if as_of.is_some_and(|at| !rel.is_active_at(at)) {
                        continue;
                    }
                    let Some(neighbor) = rel.other_end(&current).map(str::to_string) else { continue };
                    let key = (rel.source_id.clone(), rel.target_id.clone(), rel.relationship_type.clone());
                    if seen_edges.insert(key) {
                        let a = graph.ensure_node(&rel.source_id);
                        let b = graph.ensure_node(&rel.target_id);
                        graph.graph.add_edge(a, b, rel);
                    }
                    if visited.insert(neighbor.clone()) {
                        queue.push_back((neighbor, depth + 1));
                    }
                }
            }
        }
        Ok(graph)
    }

    fn entity_name(&self, id: &str, names: &mut HashMap<String, String>) -> StrataResult<String> {
        if let Some(name) = names.get(id) {
            return Ok(name.clone());
        }
        let name = self.store.get_entity(id)?.map(|e| e.name).unwrap_or_else(|| id.to_string());
        names.insert(id.to_string(), name.clone());
        Ok(name)
    }

    fn hop_evidence(&self, hop: &PathHop) -> StrataResult<Vec<(Chunk, f64)>> {
        let from: HashMap<String, f64> = self
            .store
            .get_chunks_mentioning_entity(&hop.from_id)?
            .into_iter()
            .map(|(chunk, salience)| (chunk.id, salience))
            .collect();
        Ok(self
            .store
            .get_chunks_mentioning_entity(&hop.to_id)?
            .into_iter()
            .filter_map(|(chunk, salience)| {
                from.get(&chunk.id).map(|other| {
                    let mean = (salience + other) / 2.0;
                    (chunk, mean)
                })
            })
            .collect())
    }
}

impl IStrategyExecutor for GraphTraversalExecutor {
    fn tag(&self) -> StrategyTag {
        StrategyTag::GraphTraversal
    }

    fn search(&self, query: &QueryContext, top_k: usize) -> StrataResult<Vec<SearchResult>> {
        let seeds: Vec<&str> = query.entities.iter().map(|e| e.id.as_str()).collect();
        if seeds.len() < 2 || self.max_hops == 0 {
            return Ok(Vec::new());
        }

        let graph = self.neighborhood(&seeds, query.as_of)?;
        let mut names: HashMap<String, String> =
            query.entities.iter().map(|e| (e.id.clone(), e.name.clone())).collect();
        let mut best: HashMap<String, SearchResult> = HashMap::new();
        let mut paths_found = 0usize;

        for (i, from) in seeds.iter().enumerate() {
            for to in &seeds[i + 1..] {
                let Some(path) = graph.shortest_path(from, to) else { continue };
                if path.len() < 2 || path.len() - 1 > self.max_hops {
                    continue;
                }
                paths_found += 1;

                let mut hops = Vec::with_capacity(path.len() - 1);
                let mut path_weight = 1.0;
                for pair in path.windows(2) {
                    let (Some(a), Some(b)) = (graph.get_node(&pair[0]), graph.get_node(&pair[1])) else {
                        continue;
                    };
                    let Some(rel) = graph.strongest_edge(a, b) else { continue };
                    path_weight *= rel.weight;
                    hops.push(PathHop {
                        from_id: pair[0].clone(),
                        from_name: self.entity_name(&pair[0], &mut names)?,
                        relation: rel.relationship_type.clone(),
                        to_id: pair[1].clone(),
                        to_name: self.entity_name(&pair[1], &mut names)?,
                        weight: rel.weight,
                    });
                }

                for hop in &hops {
                    let boost = relation_boost(&hop.relation);
                    for (chunk, salience) in self.hop_evidence(hop)? {
                        let score = path_weight * salience * boost;
                        let improves = best.get(&chunk.id).map_or(true, |r| score > r.score);
                        if improves {
                            let result = SearchResult::new(chunk, score, StrategyTag::GraphTraversal)
                                .with_path(hops.clone());
                            best.insert(result.chunk_id().to_string(), result);
                        }
                    }
                }
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            paths = paths_found,
            results = best.len(),
            "graph traversal complete"
        );
        Ok(finish(best.into_values().collect(), top_k))
    }
}
