//! Keyword and capitalization rules for query type, complexity, and entity mentions.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use strata_core::constants::MAX_QUERY_ENTITIES;
use strata_core::models::{QueryClassification, QueryComplexity, QueryType};
use strata_core::traits::IQueryClassifier;
use strata_core::StrataResult;

/// Queries shorter than this are treated as broad lookups.
const SHORT_QUERY_CHARS: usize = 10;

/// Word count above which complexity is bumped one level.
const LONG_QUERY_WORDS: usize = 20;

static COMPARATIVE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(compare[sd]?|comparison|versus|vs\.?|difference|differences|differ)\b").ok()
});

static TEMPORAL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(when|before|after|timeline|history|since|until|during|year|(1[89]|20)\d{2})\b").ok()
});

static ANALYTICAL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(why|how does|how do|how did|analy[sz]e|analysis|explain|cause[sd]?|impact)\b").ok()
});

static EXPLORATORY_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(overview|themes?|summari[sz]e|summary|landscape|main topics|broadly)\b").ok()
});

static COMPLEXITY_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(and|or|between|across|relationships?|connections?|multiple|chain|influence[sd]?|versus|compare)\b").ok()
});

static QUOTED_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r#""([^"]{2,})""#).ok());

static CAPITALIZED_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][\w&'.-]*(?:\s+(?:of\s+|the\s+)?[A-Z][\w&'.-]*)*").ok()
});

/// Capitalized words that start questions rather than name things.
const LEADING_STOPWORDS: &[&str] = &[
    "a", "an", "the", "who", "what", "when", "where", "why", "how", "which", "is", "are", "was",
    "were", "did", "does", "do", "can", "could", "should", "would", "tell", "give", "list", "show",
    "describe", "explain", "compare", "summarize", "summarise", "find", "i", "in", "on", "of",
];

fn type_rules() -> [(QueryType, &'static LazyLock<Option<Regex>>); 4] {
    [
        (QueryType::Comparative, &COMPARATIVE_RE),
        (QueryType::Temporal, &TEMPORAL_RE),
        (QueryType::Analytical, &ANALYTICAL_RE),
        (QueryType::Exploratory, &EXPLORATORY_RE),
    ]
}

/// Deterministic, dependency-free classifier.
///
/// The first matching type rule wins, in the order comparative, temporal,
/// analytical, exploratory; anything else is factual.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicQueryClassifier;

impl HeuristicQueryClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn query_type(query: &str) -> QueryType {
        type_rules()
            .into_iter()
            .find(|(_, re)| is_match(re, query))
            .map_or(QueryType::Factual, |(t, _)| t)
    }

    pub fn complexity(query: &str) -> QueryComplexity {
        let indicators = COMPLEXITY_RE.as_ref().map_or(0, |re| re.find_iter(query).count());
        let base = match indicators {
            0 => QueryComplexity::Simple,
            1 => QueryComplexity::Medium,
            2 | 3 => QueryComplexity::High,
            _ => QueryComplexity::VeryHigh,
        };
        if query.split_whitespace().count() > LONG_QUERY_WORDS {
            base.bump()
        } else {
            base
        }
    }

    /// Quoted phrases first, then capitalized spans, deduplicated case-insensitively.
    pub fn mentioned_entities(query: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut push = |name: String| {
            if !name.is_empty() && seen.insert(name.to_lowercase()) {
                out.push(name);
            }
        };

        if let Some(re) = QUOTED_RE.as_ref() {
            for cap in re.captures_iter(query) {
                if let Some(m) = cap.get(1) {
                    push(m.as_str().trim().to_string());
                }
            }
        }
        let unquoted = QUOTED_RE
            .as_ref()
            .map_or_else(|| query.to_string(), |re| re.replace_all(query, " ").into_owned());
        if let Some(re) = CAPITALIZED_RE.as_ref() {
            for m in re.find_iter(&unquoted) {
                push(strip_leading_stopwords(m.as_str()));
            }
        }

        out.truncate(MAX_QUERY_ENTITIES);
        out
    }
}

fn is_match(regex: &LazyLock<Option<Regex>>, text: &str) -> bool {
    regex.as_ref().is_some_and(|re| re.is_match(text))
}

fn strip_leading_stopwords(span: &str) -> String {
    let words: Vec<&str> = span.split_whitespace().collect();
    let start = words
        .iter()
        .position(|w| {
            let bare = w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            !LEADING_STOPWORDS.contains(&bare.as_str())
        })
        .unwrap_or(words.len());
    words[start..]
        .join(" ")
        .trim_end_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

impl IQueryClassifier for HeuristicQueryClassifier {
    fn classify(&self, query: &str) -> StrataResult<QueryClassification> {
        let trimmed = query.trim();
        if trimmed.chars().count() < SHORT_QUERY_CHARS {
            return Ok(QueryClassification {
                query_type: QueryType::Exploratory,
                complexity: QueryComplexity::Simple,
                mentioned_entities: Self::mentioned_entities(trimmed),
            });
        }
        Ok(QueryClassification {
            query_type: Self::query_type(trimmed),
            complexity: Self::complexity(trimmed),
            mentioned_entities: Self::mentioned_entities(trimmed),
        })
    }
}
