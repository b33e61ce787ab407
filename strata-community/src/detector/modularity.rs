use std::collections::HashMap;

use super::louvain::WorkingGraph;
use super::Partition;
use crate::graph::LevelGraph;

/// Newman modularity with resolution:
/// `Q = Σ_c [ in_c / m − γ (tot_c / 2m)² ]`. Zero for a graph with no edges.
pub(crate) fn score(graph: &WorkingGraph, membership: &[usize], resolution: f64) -> f64 {
    let m = graph.total_weight;
    if m <= 0.0 {
        return 0.0;
    }
    let mut internal: HashMap<usize, f64> = HashMap::new();
    let mut totals: HashMap<usize, f64> = HashMap::new();

    for node in 0..graph.len() {
        let c = membership[node];
        *totals.entry(c).or_default() += graph.degrees[node];
        *internal.entry(c).or_default() += graph.self_loops[node];
        for &(neighbor, w) in &graph.adjacency[node] {
            if membership[neighbor] == c {
                *internal.entry(c).or_default() += w / 2.0;
            }
        }
    }

    totals
        .iter()
        .map(|(c, tot)| {
            let inside = internal.get(c).copied().unwrap_or(0.0);
            inside / m - resolution * (tot / (2.0 * m)).powi(2)
        })
        .sum()
}

/// Modularity of an arbitrary partition of `graph`.
pub fn modularity(graph: &LevelGraph, partition: &Partition, resolution: f64) -> f64 {
    let order = graph.ordered_nodes();
    let working = WorkingGraph::from_level_graph(graph, &order);
    let membership: Vec<usize> = order
        .iter()
        .enumerate()
        .map(|(i, idx)| partition.community_of(&graph.graph[*idx]).unwrap_or(usize::MAX - i))
        .collect();
    score(&working, &membership, resolution)
}
