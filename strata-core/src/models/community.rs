use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::NodeRef;

/// One cell of the partition at a given hierarchy level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    /// 1 for the first pass over raw entities.
    pub level: u32,
    /// Entities at level 1, communities of `level - 1` above.
    pub members: Vec<NodeRef>,
    /// Leaf entities under this community.
    pub entity_count: usize,
    pub summary: Option<String>,
    pub embedding: Option<Vec<f32>>,
    /// Set once a higher level absorbs this community.
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Community {
    pub fn new(id: impl Into<String>, level: u32, members: Vec<NodeRef>) -> Self {
        Self {
            id: id.into(),
            level,
            members,
            entity_count: 0,
            summary: None,
            embedding: None,
            parent_id: None,
            created_at: Utc::now(),
        }
    }

    /// Ids of member communities (empty at level 1).
    pub fn child_community_ids(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .filter(|m| !m.is_entity())
            .map(|m| m.id.as_str())
    }

    /// Ids of member entities (empty above level 1).
    pub fn entity_member_ids(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .filter(|m| m.is_entity())
            .map(|m| m.id.as_str())
    }
}
