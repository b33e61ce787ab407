use serde::{Deserialize, Serialize};

/// An extracted entity. Nodes of the level-1 graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    /// Canonical name.
    pub name: String,
    /// Type tag, e.g. "person" or "organization".
    pub entity_type: String,
    #[serde(default)]
    pub description: String,
    /// Alternative surface forms matched during resolution.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl Entity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type: entity_type.into(),
            description: String::new(),
            aliases: Vec::new(),
            embedding: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Case-insensitive match against the canonical name and all aliases.
    pub fn matches_name(&self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        self.name.eq_ignore_ascii_case(candidate)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(candidate))
    }
}
