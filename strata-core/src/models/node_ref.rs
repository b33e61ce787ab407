use std::fmt;

use serde::{Deserialize, Serialize};

/// What a hierarchy node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Entity,
    Community,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Community => "community",
        }
    }
}

/// A node in the graph at any level: a raw entity at level 1, a community above it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef {
    pub kind: NodeKind,
    pub id: String,
}

impl NodeRef {
    pub fn entity(id: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Entity,
            id: id.into(),
        }
    }

    pub fn community(id: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Community,
            id: id.into(),
        }
    }

    pub fn is_entity(&self) -> bool {
        self.kind == NodeKind::Entity
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}
