//! Resolves entity mentions in a query against the graph store.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use strata_core::constants::MAX_QUERY_ENTITIES;
use strata_core::models::{Entity, QueryClassification};
use strata_core::traits::IGraphStore;
use strata_core::StrataResult;

pub struct EntityResolver {
    store: Arc<dyn IGraphStore>,
    /// Minimum cosine similarity for an embedding match.
    threshold: f64,
}

impl EntityResolver {
    pub fn new(store: Arc<dyn IGraphStore>, threshold: f64) -> Self {
        Self { store, threshold }
    }

    /// Resolution order: classifier-reported names (name or alias match), then
    /// known names found verbatim in the query text if that found nothing, then
    /// entities whose embedding is within the threshold of the query embedding.
    pub fn resolve(
        &self,
        query: &str,
        classification: Option<&QueryClassification>,
        embedding: Option<&[f32]>,
    ) -> StrataResult<Vec<Entity>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        let mut add = |entity: Entity, resolved: &mut Vec<Entity>| {
            if seen.insert(entity.id.clone()) {
                resolved.push(entity);
            }
        };

        if let Some(classification) = classification {
            for name in &classification.mentioned_entities {
                for entity in self.store.find_entities_by_name(name)? {
                    add(entity, &mut resolved);
                }
            }
        }

        if resolved.is_empty() {
            for entity in self.mentioned_in_text(query)? {
                add(entity, &mut resolved);
            }
        }

        if let Some(embedding) = embedding {
            for (entity, similarity) in self.store.search_entities_by_vector(embedding, MAX_QUERY_ENTITIES)? {
                if similarity >= self.threshold {
                    add(entity, &mut resolved);
                }
            }
        }

        resolved.truncate(MAX_QUERY_ENTITIES);
        debug!(resolved = resolved.len(), "query entities resolved");
        Ok(resolved)
    }

    /// Entities whose name or alias occurs in `query` on word boundaries.
    fn mentioned_in_text(&self, query: &str) -> StrataResult<Vec<Entity>> {
        let haystack = normalize(query);
        let mut found: Vec<(usize, Entity)> = self
            .store
            .get_entities()?
            .into_iter()
            .filter_map(|entity| {
                std::iter::once(&entity.name)
                    .chain(entity.aliases.iter())
                    .filter_map(|name| find_phrase(&haystack, &normalize(name)))
                    .min()
                    .map(|pos| (pos, entity))
            })
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
        Ok(found.into_iter().map(|(_, e)| e).collect())
    }
}

/// Lowercase, punctuation to spaces, padded so phrase search respects word edges.
fn normalize(text: &str) -> String {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    format!(" {} ", words.join(" "))
}

fn find_phrase(haystack: &str, needle: &str) -> Option<usize> {
    if needle.trim().is_empty() {
        return None;
    }
    haystack.find(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrase_search_respects_word_edges() {
        let hay = normalize("Who runs Acme-Corp today?");
        assert!(find_phrase(&hay, &normalize("Acme Corp")).is_some());
        assert!(find_phrase(&hay, &normalize("Acme")).is_some());
        assert!(find_phrase(&hay, &normalize("Acm")).is_none());
        assert!(find_phrase(&hay, &normalize("")).is_none());
    }
}
