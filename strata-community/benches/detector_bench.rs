use criterion::{black_box, criterion_group, criterion_main, Criterion};

use strata_community::{CommunityDetector, HierarchyBuilder, LevelGraph};
use strata_core::config::HierarchyConfig;
use strata_core::models::{Entity, Relationship};

/// `groups` dense clusters of `size` nodes chained by weak bridges.
fn clustered_graph(groups: usize, size: usize) -> (Vec<Entity>, Vec<Relationship>) {
    let id = |g: usize, i: usize| format!("g{g:03}-n{i:02}");
    let mut entities = Vec::new();
    let mut relationships = Vec::new();
    for g in 0..groups {
        for i in 0..size {
            entities.push(Entity::new(id(g, i), format!("Node {g}/{i}"), "concept"));
            for j in (i + 1)..size {
                relationships.push(Relationship::new(id(g, i), id(g, j), "related_to", 0.8));
            }
        }
        if g > 0 {
            relationships.push(Relationship::new(id(g - 1, 0), id(g, 0), "bridge", 0.1));
        }
    }
    (entities, relationships)
}

fn bench_detect(c: &mut Criterion) {
    let (entities, relationships) = clustered_graph(50, 8);
    let graph = LevelGraph::from_entity_graph(&entities, &relationships);
    let detector = CommunityDetector::new(1.0);
    c.bench_function("louvain_400_nodes", |b| b.iter(|| detector.detect(black_box(&graph))));
}

fn bench_build(c: &mut Criterion) {
    let (entities, relationships) = clustered_graph(50, 8);
    let builder = HierarchyBuilder::new(HierarchyConfig::default());
    c.bench_function("hierarchy_build_400_nodes", |b| {
        b.iter(|| builder.build(black_box(&entities), black_box(&relationships)))
    });
}

criterion_group!(benches, bench_detect, bench_build);
criterion_main!(benches);
