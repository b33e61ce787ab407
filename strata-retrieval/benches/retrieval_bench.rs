use criterion::{black_box, criterion_group, criterion_main, Criterion};

use strata_core::config::RerankConfig;
use strata_core::models::{Chunk, SearchResult, StrategyTag};
use strata_retrieval::fusion::rrf;
use strata_retrieval::{Reranker, ResultFuser};

fn candidates(n: usize) -> Vec<SearchResult> {
    (0..n)
        .map(|i| {
            let angle = i as f32 * 0.37;
            let chunk = Chunk::new(format!("chunk-{i:04}"), "doc", format!("chunk number {i}"))
                .with_embedding(vec![angle.cos(), angle.sin(), (i % 7) as f32 * 0.1]);
            let tag = StrategyTag::ALL[i % StrategyTag::ALL.len()];
            SearchResult::new(chunk, 1.0 / (1.0 + i as f64), tag)
        })
        .collect()
}

fn bench_rrf(c: &mut Criterion) {
    let lexical = rrf::ranks((0..300).map(|i| format!("c{i}")).collect::<Vec<_>>().iter().map(String::as_str));
    let vector = rrf::ranks((0..300).rev().map(|i| format!("c{i}")).collect::<Vec<_>>().iter().map(String::as_str));
    let lists = [lexical, vector];
    c.bench_function("rrf_fuse_2x300", |b| b.iter(|| rrf::fuse(black_box(&lists), 60)));
}

fn bench_fuse_and_rerank(c: &mut Criterion) {
    let pool = candidates(150);
    let fuser = ResultFuser::new(50);
    let reranker = Reranker::new(RerankConfig::default(), None);
    c.bench_function("fuse_150", |b| b.iter(|| fuser.fuse(black_box(pool.clone()))));
    let fused = fuser.fuse(pool);
    c.bench_function("mmr_rerank_50_to_10", |b| b.iter(|| reranker.rerank("query", black_box(fused.clone()), 10)));
}

criterion_group!(benches, bench_rrf, bench_fuse_and_rerank);
criterion_main!(benches);
