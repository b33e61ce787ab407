//! # strata-retrieval
//!
//! Query pipeline: classify → select strategies → fan out executors in parallel →
//! fuse → rerank with diversity. Executors read the graph store and the current
//! hierarchy snapshot; nothing here mutates either.

pub mod classification;
pub mod engine;
pub mod fusion;
pub mod ranking;
pub mod resolution;
pub mod selection;
pub mod strategies;

pub use classification::HeuristicQueryClassifier;
pub use engine::RetrievalEngine;
pub use fusion::ResultFuser;
pub use ranking::Reranker;
pub use resolution::EntityResolver;
pub use selection::{StrategyPlan, StrategyRegistry, StrategySelector};
