//! Immutable arena of community levels.
//!
//! Level 1 groups entities; level n+1 groups level-n communities. Lookups by id go
//! through an index into `(level slot, community slot)`.

mod builder;

use std::collections::{BTreeMap, HashMap};

use strata_core::constants::FIRST_COMMUNITY_LEVEL;
use strata_core::errors::HierarchyError;
use strata_core::models::{Community, NodeKind};
use strata_core::StrataResult;

pub use builder::{community_id, BuildOutcome, HierarchyBuilder};

/// All communities at one level, sorted by id.
#[derive(Debug, Clone, Default)]
pub struct HierarchyLevel {
    pub level: u32,
    pub communities: Vec<Community>,
}

impl HierarchyLevel {
    pub fn new(level: u32, mut communities: Vec<Community>) -> Self {
        communities.sort_by(|a, b| a.id.cmp(&b.id));
        Self { level, communities }
    }

    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    levels: Vec<HierarchyLevel>,
    index: HashMap<String, (usize, usize)>,
    /// Entity id -> id of its level-1 community.
    entity_index: HashMap<String, String>,
}

impl Hierarchy {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_levels(levels: Vec<HierarchyLevel>) -> Self {
        let mut index = HashMap::new();
        let mut entity_index = HashMap::new();
        for (li, level) in levels.iter().enumerate() {
            for (ci, community) in level.communities.iter().enumerate() {
                index.insert(community.id.clone(), (li, ci));
                if level.level == FIRST_COMMUNITY_LEVEL {
                    for entity in community.entity_member_ids() {
                        entity_index.insert(entity.to_string(), community.id.clone());
                    }
                }
            }
        }
        Self { levels, index, entity_index }
    }

    /// Rebuild the arena from persisted rows. Levels must be contiguous from 1.
    pub fn from_communities(communities: Vec<Community>) -> StrataResult<Self> {
        let mut grouped: BTreeMap<u32, Vec<Community>> = BTreeMap::new();
        for community in communities {
            grouped.entry(community.level).or_default().push(community);
        }
        let mut levels = Vec::with_capacity(grouped.len());
        for (expected, (level, members)) in (FIRST_COMMUNITY_LEVEL..).zip(grouped) {
            if level != expected {
                return Err(HierarchyError::InvalidGraph {
                    level,
                    reason: format!("expected level {expected}; levels must be contiguous"),
                }
                .into());
            }
            levels.push(HierarchyLevel::new(level, members));
        }
        Ok(Self::from_levels(levels))
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn levels(&self) -> &[HierarchyLevel] {
        &self.levels
    }

    pub fn level(&self, level: u32) -> Option<&HierarchyLevel> {
        let slot = level.checked_sub(FIRST_COMMUNITY_LEVEL)? as usize;
        self.levels.get(slot)
    }

    pub fn top_level(&self) -> Option<&HierarchyLevel> {
        self.levels.last()
    }

    pub fn total_communities(&self) -> usize {
        self.levels.iter().map(HierarchyLevel::len).sum()
    }

    pub fn community(&self, id: &str) -> Option<&Community> {
        let &(li, ci) = self.index.get(id)?;
        self.levels.get(li)?.communities.get(ci)
    }

    /// Member communities of `id`; empty for level-1 communities.
    pub fn children(&self, id: &str) -> Vec<&Community> {
        self.community(id)
            .map(|c| c.child_community_ids().filter_map(|child| self.community(child)).collect())
            .unwrap_or_default()
    }

    /// Entity ids under `id` at any depth, sorted.
    pub fn leaf_entity_ids(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(community) = self.community(current) else {
                continue;
            };
            for member in &community.members {
                match member.kind {
                    NodeKind::Entity => out.push(member.id.clone()),
                    NodeKind::Community => stack.push(member.id.as_str()),
                }
            }
        }
        out.sort();
        out.dedup();
        out
    }

    /// Community containing `entity_id` at `level`, following parent links up.
    pub fn community_for_entity(&self, entity_id: &str, level: u32) -> Option<&Community> {
        let mut current = self.community(self.entity_index.get(entity_id)?)?;
        while current.level < level {
            current = self.community(current.parent_id.as_deref()?)?;
        }
        (current.level == level).then_some(current)
    }

    /// Every community, level by level.
    pub fn communities(&self) -> impl Iterator<Item = &Community> {
        self.levels.iter().flat_map(|l| l.communities.iter())
    }

    pub(crate) fn levels_mut(&mut self) -> &mut [HierarchyLevel] {
        &mut self.levels
    }

    pub fn to_records(&self) -> Vec<Community> {
        self.communities().cloned().collect()
    }
}
