use std::collections::{BTreeMap, HashMap};

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::graph::LevelGraph;

/// Gains must beat staying put by more than this to trigger a move.
const GAIN_EPSILON: f64 = 1e-12;

/// Sweeps per local-moving phase. Each productive sweep strictly raises
/// modularity, so this only guards against float drift.
const MAX_SWEEPS: usize = 1_000;

/// Dense adjacency view used by the optimizer. Node `i` is the i-th node in
/// canonical order.
#[derive(Debug, Clone)]
pub(crate) struct WorkingGraph {
    pub adjacency: Vec<Vec<(usize, f64)>>,
    pub self_loops: Vec<f64>,
    pub degrees: Vec<f64>,
    /// Sum of edge weights, each undirected edge and self-loop counted once.
    pub total_weight: f64,
}

impl WorkingGraph {
    pub fn from_level_graph(graph: &LevelGraph, order: &[NodeIndex]) -> Self {
        let position: HashMap<NodeIndex, usize> =
            order.iter().enumerate().map(|(i, idx)| (*idx, i)).collect();
        let n = order.len();
        let mut adjacency: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
        let mut total_weight = 0.0;

        for edge in graph.graph.edge_references() {
            let (a, b) = (position[&edge.source()], position[&edge.target()]);
            let w = *edge.weight();
            *adjacency[a].entry(b).or_default() += w;
            *adjacency[b].entry(a).or_default() += w;
            total_weight += w;
        }

        let adjacency: Vec<Vec<(usize, f64)>> =
            adjacency.into_iter().map(|m| m.into_iter().collect()).collect();
        let degrees = adjacency.iter().map(|row| row.iter().map(|(_, w)| w).sum()).collect();

        Self { adjacency, self_loops: vec![0.0; n], degrees, total_weight }
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Collapse each community into one node. Internal edges become self-loops.
    fn aggregate(&self, membership: &[usize], count: usize) -> Self {
        let mut links: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];
        let mut self_loops = vec![0.0; count];
        let mut degrees = vec![0.0; count];

        for node in 0..self.len() {
            let cu = membership[node];
            degrees[cu] += self.degrees[node];
            self_loops[cu] += self.self_loops[node];
            for &(neighbor, w) in &self.adjacency[node] {
                let cv = membership[neighbor];
                if cu == cv {
                    // Seen once from each endpoint.
                    self_loops[cu] += w / 2.0;
                } else {
                    *links[cu].entry(cv).or_default() += w;
                }
            }
        }

        Self {
            adjacency: links.into_iter().map(|m| m.into_iter().collect()).collect(),
            self_loops,
            degrees,
            total_weight: self.total_weight,
        }
    }
}

/// Full Louvain: local moving then aggregation until no node moves.
/// Returns the compact community of each node of `graph`.
pub(crate) fn run(graph: &WorkingGraph, resolution: f64) -> Vec<usize> {
    let mut membership: Vec<usize> = (0..graph.len()).collect();
    let mut current = graph.clone();

    loop {
        let (local, moved) = local_moving(&current, resolution);
        if !moved {
            break;
        }
        let (compact, count) = renumber(&local);
        for m in membership.iter_mut() {
            *m = compact[*m];
        }
        if count == current.len() {
            break;
        }
        current = current.aggregate(&compact, count);
    }

    renumber(&membership).0
}

/// One local-moving phase starting from singletons.
fn local_moving(graph: &WorkingGraph, resolution: f64) -> (Vec<usize>, bool) {
    let n = graph.len();
    let mut community: Vec<usize> = (0..n).collect();
    let m2 = 2.0 * graph.total_weight;
    if m2 <= 0.0 {
        return (community, false);
    }

    let mut totals = graph.degrees.clone();
    let mut improved = false;

    for _ in 0..MAX_SWEEPS {
        let mut moved = false;
        for node in 0..n {
            let current = community[node];
            let k_i = graph.degrees[node];

            let mut links: BTreeMap<usize, f64> = BTreeMap::new();
            for &(neighbor, w) in &graph.adjacency[node] {
                *links.entry(community[neighbor]).or_default() += w;
            }

            totals[current] -= k_i;
            let gain = |c: usize, k_in: f64| k_in - resolution * totals[c] * k_i / m2;

            let mut best = current;
            let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.0));
            for (&candidate, &k_in) in &links {
                if candidate == current {
                    continue;
                }
                let g = gain(candidate, k_in);
                if g > best_gain + GAIN_EPSILON {
                    best = candidate;
                    best_gain = g;
                }
            }

            totals[best] += k_i;
            if best != current {
                community[node] = best;
                moved = true;
                improved = true;
            }
        }
        if !moved {
            break;
        }
    }

    (community, improved)
}

/// Map labels to `0..count` in order of first appearance.
fn renumber(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    let compact = labels
        .iter()
        .map(|label| {
            let next = mapping.len();
            *mapping.entry(*label).or_insert(next)
        })
        .collect();
    (compact, mapping.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renumber_follows_first_appearance() {
        let (compact, count) = renumber(&[4, 4, 1, 7, 1]);
        assert_eq!(compact, vec![0, 0, 1, 2, 1]);
        assert_eq!(count, 3);
    }

    #[test]
    fn aggregation_preserves_total_degree() {
        let graph = WorkingGraph {
            adjacency: vec![vec![(1, 1.0)], vec![(0, 1.0), (2, 0.5)], vec![(1, 0.5)]],
            self_loops: vec![0.0; 3],
            degrees: vec![1.0, 1.5, 0.5],
            total_weight: 1.5,
        };
        let agg = graph.aggregate(&[0, 0, 1], 2);
        assert_eq!(agg.len(), 2);
        assert!((agg.self_loops[0] - 1.0).abs() < 1e-12);
        assert_eq!(agg.adjacency[0], vec![(1, 0.5)]);
        let total: f64 = agg.degrees.iter().sum();
        assert!((total - 3.0).abs() < 1e-12);
    }
}
