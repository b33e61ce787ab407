//! Summaries and embeddings for built communities.
//!
//! Levels are processed bottom-up so a parent can summarize its children's
//! summaries. Communities within a level are independent and run on rayon.
//! A provider failure never fails the rebuild: after the retry budget the
//! field stays empty and the failure is counted.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rayon::prelude::*;
use tracing::{debug, warn};

use strata_core::config::HierarchyConfig;
use strata_core::errors::ProviderError;
use strata_core::models::{Community, Entity, NodeKind};
use strata_core::traits::{IEmbeddingProvider, ISummaryProvider};
use strata_core::StrataResult;

use crate::hierarchy::Hierarchy;

/// Bounded retries with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn from_config(config: &HierarchyConfig) -> Self {
        Self {
            max_attempts: config.enrichment_max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.enrichment_backoff_ms),
            multiplier: config.enrichment_backoff_multiplier,
        }
    }

    /// Run `op` until it succeeds or attempts run out.
    pub fn run<T>(
        &self,
        operation: &str,
        subject: &str,
        mut op: impl FnMut() -> StrataResult<T>,
    ) -> Option<T> {
        let mut delay = self.initial_backoff;
        for attempt in 1..=self.max_attempts {
            match op() {
                Ok(value) => return Some(value),
                Err(e) => {
                    warn!(operation, subject, attempt, max_attempts = self.max_attempts, error = %e, "provider call failed");
                    if attempt < self.max_attempts {
                        thread::sleep(delay);
                        delay = delay.mul_f64(self.multiplier.max(1.0));
                    }
                }
            }
        }
        None
    }
}

/// Failure counts from one enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub summaries_failed: usize,
    pub embeddings_failed: usize,
}

pub struct Enricher {
    summarizer: Option<Arc<dyn ISummaryProvider>>,
    embedder: Option<Arc<dyn IEmbeddingProvider>>,
    retry: RetryPolicy,
    max_members: usize,
}

struct Job {
    slot: usize,
    id: String,
    inputs: Vec<String>,
    fallback: String,
}

impl Enricher {
    pub fn new(
        config: &HierarchyConfig,
        summarizer: Option<Arc<dyn ISummaryProvider>>,
        embedder: Option<Arc<dyn IEmbeddingProvider>>,
    ) -> Self {
        Self {
            summarizer,
            embedder,
            retry: RetryPolicy::from_config(config),
            max_members: config.summary_max_members.max(1),
        }
    }

    pub fn enrich(&self, hierarchy: &mut Hierarchy, entities: &HashMap<String, Entity>) -> EnrichmentReport {
        let mut report = EnrichmentReport::default();
        if self.summarizer.is_none() && self.embedder.is_none() {
            debug!("no enrichment providers configured");
            return report;
        }

        for slot in 0..hierarchy.levels().len() {
            let jobs = self.jobs_for_level(hierarchy, slot, entities);
            let level = hierarchy.levels()[slot].level;
            let _span = strata_observability::enrichment_span!(level, jobs.len()).entered();

            let results: Vec<(usize, Option<String>, Option<Vec<f32>>)> =
                jobs.par_iter().map(|job| self.enrich_one(job)).collect();

            let communities = &mut hierarchy.levels_mut()[slot].communities;
            for (index, summary, embedding) in results {
                if self.summarizer.is_some() && summary.is_none() {
                    report.summaries_failed += 1;
                }
                if self.embedder.is_some() && embedding.is_none() {
                    report.embeddings_failed += 1;
                }
                let community = &mut communities[index];
                community.summary = summary;
                community.embedding = embedding;
            }
        }
        report
    }

    fn enrich_one(&self, job: &Job) -> (usize, Option<String>, Option<Vec<f32>>) {
        let summary = self.summarizer.as_ref().and_then(|provider| {
            self.retry.run("summarize", &job.id, || {
                let text = provider.summarize(&job.inputs)?;
                let text = text.trim();
                if text.is_empty() {
                    return Err(ProviderError::SummaryFailed {
                        provider: provider.name().to_string(),
                        reason: "empty summary".into(),
                    }
                    .into());
                }
                Ok(text.to_string())
            })
        });

        let embed_input = summary.as_deref().unwrap_or(&job.fallback);
        let embedding = self.embedder.as_ref().and_then(|provider| {
            self.retry.run("embed", &job.id, || provider.embed(embed_input))
        });

        (job.slot, summary, embedding)
    }

    fn jobs_for_level(
        &self,
        hierarchy: &Hierarchy,
        slot: usize,
        entities: &HashMap<String, Entity>,
    ) -> Vec<Job> {
        hierarchy.levels()[slot]
            .communities
            .iter()
            .enumerate()
            .map(|(index, community)| {
                let fallback = self.fallback_text(hierarchy, community, entities);
                let inputs = community
                    .members
                    .iter()
                    .take(self.max_members)
                    .filter_map(|member| match member.kind {
                        NodeKind::Entity => entities.get(&member.id).map(member_line),
                        NodeKind::Community => hierarchy.community(&member.id).map(|child| {
                            child
                                .summary
                                .clone()
                                .unwrap_or_else(|| self.fallback_text(hierarchy, child, entities))
                        }),
                    })
                    .collect();
                Job { slot: index, id: community.id.clone(), inputs, fallback }
            })
            .collect()
    }

    /// Deterministic description used when no summary is available.
    pub fn fallback_text(
        &self,
        hierarchy: &Hierarchy,
        community: &Community,
        entities: &HashMap<String, Entity>,
    ) -> String {
        let leaves = if community.level == strata_core::constants::FIRST_COMMUNITY_LEVEL {
            community.entity_member_ids().map(str::to_string).collect()
        } else {
            hierarchy.leaf_entity_ids(&community.id)
        };
        let named: Vec<String> = leaves
            .iter()
            .take(self.max_members)
            .map(|id| match entities.get(id) {
                Some(e) => format!("{} ({})", e.name, e.entity_type),
                None => id.clone(),
            })
            .collect();
        let remaining = leaves.len().saturating_sub(named.len());
        let mut text = format!("Community of {} entities including: {}", leaves.len(), named.join(", "));
        if remaining > 0 {
            text.push_str(&format!(" and {remaining} more"));
        }
        text
    }
}

fn member_line(entity: &Entity) -> String {
    if entity.description.is_empty() {
        format!("{} ({})", entity.name, entity.entity_type)
    } else {
        format!("{} ({}): {}", entity.name, entity.entity_type, entity.description)
    }
}
