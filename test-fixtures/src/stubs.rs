//! Deterministic provider stubs.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use strata_core::errors::{EmbeddingError, ProviderError};
use strata_core::models::{Chunk, QueryClassification};
use strata_core::traits::{IEmbeddingProvider, IQueryClassifier, IRelevanceScorer, ISummaryProvider};
use strata_core::StrataResult;

/// Bag-of-words embedder: each lowercase word is hashed into a bucket, then the
/// vector is L2-normalized. Texts sharing words have positive cosine similarity.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    pub dims: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dims: 64 }
    }
}

impl IEmbeddingProvider for HashEmbedder {
    fn embed(&self, text: &str) -> StrataResult<Vec<f32>> {
        let mut v = vec![0.0f32; self.dims];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
        {
            let hash = blake3::hash(word.as_bytes());
            let bytes: [u8; 8] = hash.as_bytes()[..8].try_into().unwrap_or([0; 8]);
            v[(u64::from_le_bytes(bytes) % self.dims as u64) as usize] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "hash-embedder"
    }
}

/// Returns a fixed vector per exact input text; unknown texts fail.
#[derive(Debug, Clone, Default)]
pub struct TableEmbedder {
    pub vectors: HashMap<String, Vec<f32>>,
}

impl TableEmbedder {
    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

impl IEmbeddingProvider for TableEmbedder {
    fn embed(&self, text: &str) -> StrataResult<Vec<f32>> {
        self.vectors.get(text).cloned().ok_or_else(|| {
            EmbeddingError::InferenceFailed { reason: format!("no vector for {text:?}") }.into()
        })
    }

    fn dimensions(&self) -> usize {
        self.vectors.values().next().map_or(0, Vec::len)
    }

    fn name(&self) -> &str {
        "table-embedder"
    }
}

/// Always fails; counts calls.
#[derive(Debug, Default)]
pub struct FailingEmbedder {
    pub calls: AtomicUsize,
}

impl IEmbeddingProvider for FailingEmbedder {
    fn embed(&self, _text: &str) -> StrataResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EmbeddingError::ProviderUnavailable { provider: "failing".into() }.into())
    }

    fn dimensions(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "failing-embedder"
    }
}

/// Joins its inputs: `"<n> items: a; b; c"`.
#[derive(Debug, Default)]
pub struct JoinSummarizer;

impl ISummaryProvider for JoinSummarizer {
    fn summarize(&self, texts: &[String]) -> StrataResult<String> {
        Ok(format!("{} items: {}", texts.len(), texts.join("; ")))
    }

    fn name(&self) -> &str {
        "join-summarizer"
    }
}

/// Always fails; counts calls.
#[derive(Debug, Default)]
pub struct FailingSummarizer {
    pub calls: AtomicUsize,
}

impl ISummaryProvider for FailingSummarizer {
    fn summarize(&self, _texts: &[String]) -> StrataResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::SummaryFailed { provider: "failing".into(), reason: "offline".into() }.into())
    }

    fn name(&self) -> &str {
        "failing-summarizer"
    }
}

/// Fails the first `failures` calls, then behaves like [`JoinSummarizer`].
#[derive(Debug)]
pub struct FlakySummarizer {
    remaining: AtomicUsize,
}

impl FlakySummarizer {
    pub fn new(failures: usize) -> Self {
        Self { remaining: AtomicUsize::new(failures) }
    }
}

impl ISummaryProvider for FlakySummarizer {
    fn summarize(&self, texts: &[String]) -> StrataResult<String> {
        let before = self.remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if before.is_ok() {
            return Err(ProviderError::SummaryFailed { provider: "flaky".into(), reason: "transient".into() }.into());
        }
        JoinSummarizer.summarize(texts)
    }

    fn name(&self) -> &str {
        "flaky-summarizer"
    }
}

/// Blocks its first call between two barriers so a test can act while a
/// rebuild is in flight: wait on `entered`, do the work, then wait on `release`.
#[derive(Debug)]
pub struct GatedSummarizer {
    pub entered: Arc<Barrier>,
    pub release: Arc<Barrier>,
    armed: AtomicBool,
}

impl GatedSummarizer {
    pub fn new() -> Self {
        Self { entered: Arc::new(Barrier::new(2)), release: Arc::new(Barrier::new(2)), armed: AtomicBool::new(true) }
    }
}

impl Default for GatedSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ISummaryProvider for GatedSummarizer {
    fn summarize(&self, texts: &[String]) -> StrataResult<String> {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.wait();
            self.release.wait();
        }
        JoinSummarizer.summarize(texts)
    }

    fn name(&self) -> &str {
        "gated-summarizer"
    }
}

/// Returns the same classification for every query.
#[derive(Debug, Clone)]
pub struct StaticClassifier(pub QueryClassification);

impl IQueryClassifier for StaticClassifier {
    fn classify(&self, _query: &str) -> StrataResult<QueryClassification> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Default)]
pub struct FailingClassifier;

impl IQueryClassifier for FailingClassifier {
    fn classify(&self, _query: &str) -> StrataResult<QueryClassification> {
        Err(ProviderError::ClassificationFailed { reason: "offline".into() }.into())
    }
}

/// Relevance from a table keyed by chunk id; listed ids fail, others score 0.
#[derive(Debug, Clone, Default)]
pub struct TableScorer {
    pub scores: HashMap<String, f64>,
    pub failing: HashSet<String>,
}

impl TableScorer {
    pub fn with(mut self, chunk_id: &str, score: f64) -> Self {
        self.scores.insert(chunk_id.to_string(), score);
        self
    }

    pub fn failing_on(mut self, chunk_id: &str) -> Self {
        self.failing.insert(chunk_id.to_string());
        self
    }
}

impl IRelevanceScorer for TableScorer {
    fn score(&self, _query: &str, chunk: &Chunk) -> StrataResult<f64> {
        if self.failing.contains(&chunk.id) {
            return Err(ProviderError::ScoringFailed { chunk_id: chunk.id.clone(), reason: "scorer error".into() }.into());
        }
        Ok(self.scores.get(&chunk.id).copied().unwrap_or(0.0))
    }

    fn name(&self) -> &str {
        "table-scorer"
    }
}
