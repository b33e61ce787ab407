use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;
use crate::errors::{RetrievalError, StrataError};

/// Retrieval strategies. Declaration order is the canonical dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTag {
    Vector,
    Hybrid,
    EntityAware,
    GraphTraversal,
    CommunityBased,
}

impl StrategyTag {
    pub const ALL: [StrategyTag; 5] = [
        Self::Vector,
        Self::Hybrid,
        Self::EntityAware,
        Self::GraphTraversal,
        Self::CommunityBased,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Hybrid => "hybrid",
            Self::EntityAware => "entity_aware",
            Self::GraphTraversal => "graph_traversal",
            Self::CommunityBased => "community_based",
        }
    }
}

impl fmt::Display for StrategyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyTag {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| {
                RetrievalError::NoExecutor {
                    strategy: s.to_string(),
                }
                .into()
            })
    }
}

/// Query intent as reported by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Factual,
    Analytical,
    Comparative,
    Exploratory,
    Temporal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryComplexity {
    Simple,
    Medium,
    High,
    VeryHigh,
}

impl QueryComplexity {
    /// One level up, saturating at `VeryHigh`.
    pub fn bump(self) -> Self {
        match self {
            Self::Simple => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::VeryHigh => Self::VeryHigh,
        }
    }
}

/// Output of an external query classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryClassification {
    pub query_type: QueryType,
    pub complexity: QueryComplexity,
    /// Entity names as they appear in the query.
    #[serde(default)]
    pub mentioned_entities: Vec<String>,
}

/// Caller-facing search parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Forces this executor set, bypassing the selector.
    #[serde(default)]
    pub strategy_hint: Option<Vec<StrategyTag>>,
    /// `None` uses the configured default.
    #[serde(default)]
    pub top_k: Option<usize>,
    /// Only relationships active at this instant are traversed.
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            strategy_hint: None,
            top_k: None,
            as_of: None,
        }
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn hint(mut self, strategies: Vec<StrategyTag>) -> Self {
        self.strategy_hint = Some(strategies);
        self
    }

    pub fn as_of(mut self, at: DateTime<Utc>) -> Self {
        self.as_of = Some(at);
        self
    }
}

/// Everything an executor needs about the query, computed once per search.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    pub text: String,
    /// `None` when the embedding provider failed.
    pub embedding: Option<Vec<f32>>,
    pub classification: Option<QueryClassification>,
    /// Mentioned entities resolved against the store, in resolution order.
    pub entities: Vec<Entity>,
    pub as_of: Option<DateTime<Utc>>,
}

impl QueryContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = entities;
        self
    }

    pub fn with_classification(mut self, classification: QueryClassification) -> Self {
        self.classification = Some(classification);
        self
    }
}
