//! Undirected weighted graph for one hierarchy level, over `NodeRef` nodes.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use strata_core::models::{Entity, NodeRef, Relationship};

use crate::detector::Partition;

/// petgraph `UnGraph` plus an index from `NodeRef` to `NodeIndex`.
///
/// Parallel edges are merged by summing weights; self-loops are dropped.
#[derive(Debug, Clone, Default)]
pub struct LevelGraph {
    pub graph: UnGraph<NodeRef, f64>,
    pub node_index: HashMap<NodeRef, NodeIndex>,
}

impl LevelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level-1 graph: every entity is a node, relationships are undirected edges.
    ///
    /// Nodes are inserted in id order. Relationships with non-positive weight or an
    /// unknown endpoint are ignored.
    pub fn from_entity_graph(entities: &[Entity], relationships: &[Relationship]) -> Self {
        let mut ids: Vec<&str> = entities.iter().map(|e| e.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();

        let mut level = Self::new();
        for id in ids {
            level.ensure_node(&NodeRef::entity(id));
        }
        for rel in relationships {
            if rel.weight.is_nan() || rel.weight <= 0.0 {
                continue;
            }
            let source = NodeRef::entity(rel.source_id.as_str());
            let target = NodeRef::entity(rel.target_id.as_str());
            if level.get_node(&source).is_none() || level.get_node(&target).is_none() {
                continue;
            }
            level.add_weight(&source, &target, rel.weight);
        }
        level
    }

    /// Contract a partition of this graph: one node per community, edge weights
    /// summed over all inter-community edges. `community_ids[i]` names community `i`.
    pub fn contract(&self, partition: &Partition, community_ids: &[String]) -> Self {
        let mut ordered: Vec<&String> = community_ids.iter().collect();
        ordered.sort();

        let mut next = Self::new();
        for id in ordered {
            next.ensure_node(&NodeRef::community(id.as_str()));
        }
        for edge in self.graph.edge_references() {
            let a = &self.graph[edge.source()];
            let b = &self.graph[edge.target()];
            let (Some(ca), Some(cb)) = (partition.community_of(a), partition.community_of(b)) else {
                continue;
            };
            if ca == cb {
                continue;
            }
            next.add_weight(
                &NodeRef::community(community_ids[ca].as_str()),
                &NodeRef::community(community_ids[cb].as_str()),
                *edge.weight(),
            );
        }
        next
    }

    /// Get or create the node for `node`.
    pub fn ensure_node(&mut self, node: &NodeRef) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(node) {
            return idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.node_index.insert(node.clone(), idx);
        idx
    }

    pub fn get_node(&self, node: &NodeRef) -> Option<NodeIndex> {
        self.node_index.get(node).copied()
    }

    /// Add `weight` to the edge between `a` and `b`, creating it if needed.
    pub fn add_weight(&mut self, a: &NodeRef, b: &NodeRef, weight: f64) {
        if a == b || weight.is_nan() || weight <= 0.0 {
            return;
        }
        let ia = self.ensure_node(a);
        let ib = self.ensure_node(b);
        match self.graph.find_edge(ia, ib) {
            Some(edge) => self.graph[edge] += weight,
            None => {
                self.graph.add_edge(ia, ib, weight);
            }
        }
    }

    /// Weight of the edge between `a` and `b`, 0.0 when absent.
    pub fn weight_between(&self, a: &NodeRef, b: &NodeRef) -> f64 {
        match (self.get_node(a), self.get_node(b)) {
            (Some(ia), Some(ib)) => self
                .graph
                .find_edge(ia, ib)
                .map(|e| self.graph[e])
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Node indices sorted by `NodeRef`, the canonical visiting order.
    pub fn ordered_nodes(&self) -> Vec<NodeIndex> {
        let mut nodes: Vec<NodeIndex> = self.graph.node_indices().collect();
        nodes.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        nodes
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> f64 {
        self.graph.edge_weights().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_edges_merge_and_self_loops_drop() {
        let entities = vec![Entity::new("b", "B", "t"), Entity::new("a", "A", "t")];
        let rels = vec![
            Relationship::new("a", "b", "x", 0.25),
            Relationship::new("b", "a", "y", 0.5),
            Relationship::new("a", "a", "self", 0.9),
            Relationship::new("a", "ghost", "x", 0.9),
        ];
        let g = LevelGraph::from_entity_graph(&entities, &rels);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert!((g.weight_between(&NodeRef::entity("a"), &NodeRef::entity("b")) - 0.75).abs() < 1e-12);

        let order: Vec<&NodeRef> = g.ordered_nodes().into_iter().map(|i| &g.graph[i]).collect();
        assert_eq!(order, vec![&NodeRef::entity("a"), &NodeRef::entity("b")]);
    }
}
