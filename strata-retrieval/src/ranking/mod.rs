//! Final ordering: pairwise relevance scoring, then diversity-aware selection.

mod reranker;

pub use reranker::Reranker;
