use std::collections::HashSet;

use proptest::prelude::*;

use strata_community::{CommunityDetector, HierarchyBuilder, LevelGraph};
use strata_core::config::HierarchyConfig;
use strata_core::models::{Entity, Relationship};

fn graph_strategy() -> impl Strategy<Value = (Vec<Entity>, Vec<Relationship>)> {
    (1usize..24).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n, 0.05f64..=1.0), 0..(n * 3));
        (Just(n), edges).prop_map(|(n, edges)| {
            let entities = (0..n).map(|i| Entity::new(format!("e{i:02}"), format!("E{i}"), "concept")).collect();
            let relationships = edges
                .into_iter()
                .enumerate()
                .map(|(k, (a, b, w))| Relationship::new(format!("e{a:02}"), format!("e{b:02}"), format!("r{k}"), w))
                .collect();
            (entities, relationships)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Every node of every level graph lands in exactly one community.
    #[test]
    fn partition_covers_each_node_once((entities, relationships) in graph_strategy()) {
        let graph = LevelGraph::from_entity_graph(&entities, &relationships);
        let partition = CommunityDetector::new(1.0).detect(&graph);

        let mut seen = HashSet::new();
        for members in &partition.communities {
            prop_assert!(!members.is_empty());
            for m in members {
                prop_assert!(seen.insert(m.clone()));
            }
        }
        prop_assert_eq!(seen.len(), entities.len());
        prop_assert!(partition.modularity <= 1.0);
    }

    /// Same input, same hierarchy.
    #[test]
    fn build_is_deterministic((entities, relationships) in graph_strategy()) {
        let builder = HierarchyBuilder::new(HierarchyConfig::default());
        let a = builder.build(&entities, &relationships).unwrap();
        let b = builder.build(&entities, &relationships).unwrap();
        let ids_a: Vec<_> = a.hierarchy.communities().map(|c| (c.id.clone(), c.members.clone())).collect();
        let ids_b: Vec<_> = b.hierarchy.communities().map(|c| (c.id.clone(), c.members.clone())).collect();
        prop_assert_eq!(ids_a, ids_b);
    }

    /// Depth is bounded, levels shrink, and every level accounts for every entity.
    #[test]
    fn hierarchy_shape_holds((entities, relationships) in graph_strategy(), max_levels in 1u32..5) {
        let config = HierarchyConfig { max_levels, ..HierarchyConfig::default() };
        let hierarchy = HierarchyBuilder::new(config).build(&entities, &relationships).unwrap().hierarchy;

        prop_assert!(hierarchy.level_count() <= max_levels);
        prop_assert!(hierarchy.level_count() >= 1);

        let mut previous = usize::MAX;
        for level in hierarchy.levels() {
            prop_assert!(level.len() < previous || level.level == 1);
            previous = level.len();
            let entity_total: usize = level.communities.iter().map(|c| c.entity_count).sum();
            prop_assert_eq!(entity_total, entities.len());
            for community in &level.communities {
                match &community.parent_id {
                    Some(parent) => prop_assert_eq!(hierarchy.community(parent).unwrap().level, level.level + 1),
                    None => prop_assert_eq!(level.level, hierarchy.level_count()),
                }
            }
        }
    }
}
