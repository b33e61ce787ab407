use std::collections::HashMap;

use tracing::{debug, info};

use strata_core::config::HierarchyConfig;
use strata_core::constants::{COMMUNITY_ID_HASH_LEN, FIRST_COMMUNITY_LEVEL};
use strata_core::models::{Community, Entity, NodeRef, Relationship};
use strata_core::StrataResult;

use super::{Hierarchy, HierarchyLevel};
use crate::detector::{CommunityDetector, Partition};
use crate::graph::LevelGraph;

/// Structure produced by [`HierarchyBuilder::build`], before enrichment.
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub hierarchy: Hierarchy,
    pub modularity_per_level: Vec<f64>,
}

/// Stable id derived from level and member set.
pub fn community_id(level: u32, members: &[NodeRef]) -> String {
    let mut ids: Vec<&str> = members.iter().map(|m| m.id.as_str()).collect();
    ids.sort_unstable();
    let mut hasher = blake3::Hasher::new();
    for id in ids {
        hasher.update(id.as_bytes());
        hasher.update(b"\n");
    }
    let hex = hasher.finalize().to_hex();
    format!("c{level}-{}", &hex[..COMMUNITY_ID_HASH_LEN])
}

/// Iterates detection over successively contracted graphs.
#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    config: HierarchyConfig,
}

impl HierarchyBuilder {
    pub fn new(config: HierarchyConfig) -> Self {
        Self { config }
    }

    /// Build every level from the entity graph.
    ///
    /// Stops when a level has at most `min_communities` communities, when
    /// `max_levels` is reached, or when detection no longer compresses the graph.
    /// A non-compressing pass above level 1 is discarded rather than stored as a
    /// copy of the level below it.
    pub fn build(
        &self,
        entities: &[Entity],
        relationships: &[Relationship],
    ) -> StrataResult<BuildOutcome> {
        let mut graph = LevelGraph::from_entity_graph(entities, relationships);
        if graph.node_count() == 0 {
            debug!("entity graph is empty, no communities to build");
            return Ok(BuildOutcome::default());
        }

        let mut levels: Vec<HierarchyLevel> = Vec::new();
        let mut modularity_per_level = Vec::new();
        let mut level = FIRST_COMMUNITY_LEVEL;

        loop {
            let input_nodes = graph.node_count();
            let detector = CommunityDetector::new(self.config.resolution_for_level(level));
            let partition = detector.detect(&graph);
            let count = partition.community_count();

            if level > FIRST_COMMUNITY_LEVEL && count == input_nodes {
                debug!(level, nodes = input_nodes, "no further compression, stopping");
                break;
            }

            let previous = levels.last();
            let communities = materialize(level, &partition, previous);
            let ids: Vec<String> = communities.iter().map(|c| c.id.clone()).collect();

            if let Some(prev) = levels.last_mut() {
                assign_parents(prev, &communities);
            }

            info!(
                level,
                nodes = input_nodes,
                communities = count,
                modularity = partition.modularity,
                "hierarchy level built"
            );

            let next_graph = graph.contract(&partition, &ids);
            levels.push(HierarchyLevel::new(level, communities));
            modularity_per_level.push(partition.modularity);

            if count <= self.config.min_communities
                || level >= self.config.max_levels
                || count == input_nodes
            {
                break;
            }
            graph = next_graph;
            level += 1;
        }

        Ok(BuildOutcome { hierarchy: Hierarchy::from_levels(levels), modularity_per_level })
    }
}

fn materialize(level: u32, partition: &Partition, previous: Option<&HierarchyLevel>) -> Vec<Community> {
    let child_sizes: HashMap<&str, usize> = previous
        .map(|p| p.communities.iter().map(|c| (c.id.as_str(), c.entity_count)).collect())
        .unwrap_or_default();

    partition
        .communities
        .iter()
        .map(|members| {
            let id = community_id(level, members);
            let mut community = Community::new(id, level, members.clone());
            community.entity_count = members
                .iter()
                .map(|m| if m.is_entity() { 1 } else { child_sizes.get(m.id.as_str()).copied().unwrap_or(0) })
                .sum();
            community
        })
        .collect()
}

fn assign_parents(previous: &mut HierarchyLevel, parents: &[Community]) {
    let parent_of: HashMap<&str, &str> = parents
        .iter()
        .flat_map(|p| p.child_community_ids().map(move |child| (child, p.id.as_str())))
        .collect();
    for child in &mut previous.communities {
        child.parent_id = parent_of.get(child.id.as_str()).map(|p| p.to_string());
    }
}
