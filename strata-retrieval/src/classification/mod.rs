//! Query classification.

mod heuristic;

pub use heuristic::HeuristicQueryClassifier;
