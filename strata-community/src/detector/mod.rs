//! Deterministic modularity-based community detection.

mod louvain;
mod modularity;

use std::collections::HashMap;

use strata_core::models::NodeRef;

use crate::graph::LevelGraph;

pub use modularity::modularity;

/// Result of partitioning one level graph.
///
/// Community indices are compact (`0..community_count`) and numbered in order of
/// their first member. Every input node appears in exactly one community.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// Members of each community, sorted.
    pub communities: Vec<Vec<NodeRef>>,
    pub assignments: HashMap<NodeRef, usize>,
    pub modularity: f64,
}

impl Partition {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn community_count(&self) -> usize {
        self.communities.len()
    }

    pub fn community_of(&self, node: &NodeRef) -> Option<usize> {
        self.assignments.get(node).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }
}

/// Louvain detector with a fixed resolution.
///
/// Nodes are visited in `NodeRef` order and ties go to the lowest community index,
/// so the same graph always yields the same partition.
#[derive(Debug, Clone, Copy)]
pub struct CommunityDetector {
    resolution: f64,
}

impl CommunityDetector {
    pub fn new(resolution: f64) -> Self {
        Self { resolution }
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn detect(&self, graph: &LevelGraph) -> Partition {
        if graph.node_count() == 0 {
            return Partition::empty();
        }

        let order = graph.ordered_nodes();
        let working = louvain::WorkingGraph::from_level_graph(graph, &order);
        let membership = louvain::run(&working, self.resolution);
        let score = modularity::score(&working, &membership, self.resolution);

        let count = membership.iter().copied().max().map_or(0, |m| m + 1);
        let mut communities: Vec<Vec<NodeRef>> = vec![Vec::new(); count];
        let mut assignments = HashMap::with_capacity(order.len());
        for (position, &community) in membership.iter().enumerate() {
            let node = graph.graph[order[position]].clone();
            assignments.insert(node.clone(), community);
            communities[community].push(node);
        }
        for members in &mut communities {
            members.sort();
        }

        Partition { communities, assignments, modularity: score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::models::{Entity, Relationship};

    fn entity_graph(ids: &[&str], edges: &[(&str, &str, f64)]) -> LevelGraph {
        let entities: Vec<Entity> = ids.iter().map(|id| Entity::new(*id, *id, "concept")).collect();
        let rels: Vec<Relationship> = edges
            .iter()
            .map(|(a, b, w)| Relationship::new(*a, *b, "related_to", *w))
            .collect();
        LevelGraph::from_entity_graph(&entities, &rels)
    }

    fn two_triangles() -> LevelGraph {
        entity_graph(
            &["a", "b", "c", "x", "y", "z"],
            &[
                ("a", "b", 0.8),
                ("b", "c", 0.8),
                ("a", "c", 0.8),
                ("x", "y", 0.8),
                ("y", "z", 0.8),
                ("x", "z", 0.8),
            ],
        )
    }

    fn ids(members: &[NodeRef]) -> Vec<&str> {
        members.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn two_triangles_split_in_two() {
        let partition = CommunityDetector::new(1.0).detect(&two_triangles());
        assert_eq!(partition.community_count(), 2);
        assert_eq!(ids(&partition.communities[0]), vec!["a", "b", "c"]);
        assert_eq!(ids(&partition.communities[1]), vec!["x", "y", "z"]);
        assert!((partition.modularity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn bridged_cliques_still_split() {
        let g = entity_graph(
            &["a", "b", "c", "x", "y", "z"],
            &[
                ("a", "b", 1.0),
                ("b", "c", 1.0),
                ("a", "c", 1.0),
                ("x", "y", 1.0),
                ("y", "z", 1.0),
                ("x", "z", 1.0),
                ("c", "x", 0.1),
            ],
        );
        let partition = CommunityDetector::new(1.0).detect(&g);
        assert_eq!(partition.community_count(), 2);
        assert_ne!(
            partition.community_of(&NodeRef::entity("c")),
            partition.community_of(&NodeRef::entity("x"))
        );
    }

    #[test]
    fn empty_graph_gives_empty_partition() {
        let partition = CommunityDetector::new(1.0).detect(&LevelGraph::new());
        assert!(partition.is_empty());
        assert_eq!(partition.modularity, 0.0);
    }

    #[test]
    fn edgeless_graph_gives_singletons() {
        let partition = CommunityDetector::new(1.0).detect(&entity_graph(&["c", "a", "b"], &[]));
        assert_eq!(partition.community_count(), 3);
        assert_eq!(partition.modularity, 0.0);
        assert_eq!(ids(&partition.communities[0]), vec!["a"]);
    }

    #[test]
    fn detection_is_deterministic() {
        let g = two_triangles();
        let detector = CommunityDetector::new(1.0);
        let first = detector.detect(&g);
        for _ in 0..5 {
            let again = detector.detect(&g);
            assert_eq!(again.communities, first.communities);
        }
    }

    #[test]
    fn every_node_assigned_exactly_once() {
        let g = entity_graph(
            &["a", "b", "c", "d", "e"],
            &[("a", "b", 0.5), ("b", "c", 0.4), ("d", "e", 0.9)],
        );
        let partition = CommunityDetector::new(1.0).detect(&g);
        let total: usize = partition.communities.iter().map(Vec::len).sum();
        assert_eq!(total, 5);
        assert_eq!(partition.assignments.len(), 5);
    }
}
