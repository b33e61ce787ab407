use crate::errors::StrataResult;
use crate::models::QueryClassification;

/// Classifies a raw query into type, complexity, and mentioned entity names.
pub trait IQueryClassifier: Send + Sync {
    fn classify(&self, query: &str) -> StrataResult<QueryClassification>;
}
