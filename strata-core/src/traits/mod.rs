mod classifier;
mod embedding;
mod graph_store;
mod relevance;
mod strategy;
mod summary;

pub use classifier::IQueryClassifier;
pub use embedding::IEmbeddingProvider;
pub use graph_store::IGraphStore;
pub use relevance::IRelevanceScorer;
pub use strategy::IStrategyExecutor;
pub use summary::ISummaryProvider;
