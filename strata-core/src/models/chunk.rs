use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MENTION_SALIENCE;

/// A retrievable span of document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub text: String,
    /// Position within the owning document.
    #[serde(default)]
    pub chunk_index: u32,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    pub fn new(
        id: impl Into<String>,
        document_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            document_id: document_id.into(),
            text: text.into(),
            chunk_index: 0,
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_index(mut self, chunk_index: u32) -> Self {
        self.chunk_index = chunk_index;
        self
    }
}

/// A chunk → entity mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMention {
    pub chunk_id: String,
    pub entity_id: String,
    /// How central the entity is to the chunk, in `[0, 1]`.
    #[serde(default = "default_salience")]
    pub salience: f64,
}

impl ChunkMention {
    pub fn new(chunk_id: impl Into<String>, entity_id: impl Into<String>, salience: f64) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            entity_id: entity_id.into(),
            salience,
        }
    }
}

fn default_salience() -> f64 {
    DEFAULT_MENTION_SALIENCE
}
