//! Rule-based strategy selection and the executor registry.

mod registry;

pub use registry::StrategyRegistry;

use std::collections::BTreeSet;

use tracing::{info, warn};

use strata_core::models::{QueryClassification, QueryComplexity, QueryType, StrategyTag};

/// Strategies chosen for one query and the rules that chose them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyPlan {
    /// In canonical dispatch order, no duplicates, never empty.
    pub tags: Vec<StrategyTag>,
    pub reason: String,
}

impl StrategyPlan {
    fn vector_only(reason: impl Into<String>) -> Self {
        Self { tags: vec![StrategyTag::Vector], reason: reason.into() }
    }
}

/// Deterministic rule table from classification to strategies.
///
/// Rules are cumulative: every rule that fires adds its strategies.
#[derive(Debug, Clone)]
pub struct StrategySelector {
    min_query_chars: usize,
}

impl StrategySelector {
    pub fn new(min_query_chars: usize) -> Self {
        Self { min_query_chars }
    }

    /// `resolved_entities` is the number of query entities found in the store.
    pub fn select(
        &self,
        query: &str,
        classification: Option<&QueryClassification>,
        resolved_entities: usize,
    ) -> StrategyPlan {
        if query.trim().chars().count() < self.min_query_chars {
            return StrategyPlan::vector_only("short query");
        }
        let Some(classification) = classification else {
            return StrategyPlan::vector_only("no classification");
        };

        let mut tags = BTreeSet::new();
        let mut reasons = Vec::new();

        if matches!(classification.query_type, QueryType::Comparative | QueryType::Analytical) {
            tags.extend([StrategyTag::Hybrid, StrategyTag::GraphTraversal]);
            reasons.push("comparative/analytical");
        }
        if classification.complexity >= QueryComplexity::High {
            tags.insert(StrategyTag::GraphTraversal);
            reasons.push("high complexity");
        }
        if classification.query_type == QueryType::Temporal {
            tags.insert(StrategyTag::Hybrid);
            reasons.push("temporal");
        }
        if resolved_entities > 0 {
            tags.insert(StrategyTag::EntityAware);
            reasons.push("known entities");
        }
        if classification.query_type == QueryType::Exploratory {
            tags.insert(StrategyTag::CommunityBased);
            reasons.push("exploratory");
        }

        if tags.is_empty() {
            return StrategyPlan::vector_only("default");
        }
        StrategyPlan { tags: tags.into_iter().collect(), reason: reasons.join(", ") }
    }

    /// Select, or honor `hint` when given. Tags without a registered executor
    /// are replaced by vector.
    pub fn plan(
        &self,
        query: &str,
        classification: Option<&QueryClassification>,
        resolved_entities: usize,
        hint: Option<&[StrategyTag]>,
        registry: &StrategyRegistry,
    ) -> StrategyPlan {
        let mut plan = match hint {
            Some(hint) if !hint.is_empty() => {
                let tags: BTreeSet<StrategyTag> = hint.iter().copied().collect();
                StrategyPlan { tags: tags.into_iter().collect(), reason: "hint".into() }
            }
            _ => self.select(query, classification, resolved_entities),
        };

        let (mut available, missing): (Vec<StrategyTag>, Vec<StrategyTag>) =
            plan.tags.iter().copied().partition(|tag| registry.contains(*tag));
        if !missing.is_empty() {
            // Each unserved strategy is replaced by vector search.
            warn!(missing = ?missing, "no executor registered for strategy, substituting vector");
            if registry.contains(StrategyTag::Vector) && !available.contains(&StrategyTag::Vector) {
                available.insert(0, StrategyTag::Vector);
            }
        }
        if available.is_empty() {
            warn!(reason = %plan.reason, "falling back to vector");
            plan = StrategyPlan::vector_only(format!("{}; fallback", plan.reason));
        } else {
            plan.tags = available;
        }

        info!(strategies = ?plan.tags, reason = %plan.reason, "strategies selected");
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(query_type: QueryType, complexity: QueryComplexity) -> QueryClassification {
        QueryClassification { query_type, complexity, mentioned_entities: Vec::new() }
    }

    fn tags(plan: StrategyPlan) -> Vec<StrategyTag> {
        plan.tags
    }

    const QUERY: &str = "a sufficiently long query";

    #[test]
    fn missing_classification_is_vector_only() {
        assert_eq!(tags(StrategySelector::new(10).select(QUERY, None, 3)), vec![StrategyTag::Vector]);
    }

    #[test]
    fn short_query_is_vector_only() {
        let c = classification(QueryType::Comparative, QueryComplexity::VeryHigh);
        assert_eq!(tags(StrategySelector::new(10).select("  acme  ", Some(&c), 2)), vec![StrategyTag::Vector]);
    }

    #[test]
    fn rule_table() {
        use QueryComplexity::*;
        use QueryType::*;
        use StrategyTag::*;
        let s = StrategySelector::new(10);
        let cases = [
            (Comparative, Simple, 0, vec![Hybrid, GraphTraversal]),
            (Analytical, Medium, 2, vec![Hybrid, EntityAware, GraphTraversal]),
            (Factual, High, 0, vec![GraphTraversal]),
            (Temporal, Simple, 0, vec![Hybrid]),
            (Factual, Simple, 1, vec![EntityAware]),
            (Exploratory, Simple, 0, vec![CommunityBased]),
            (Exploratory, VeryHigh, 1, vec![EntityAware, GraphTraversal, CommunityBased]),
            (Factual, Medium, 0, vec![Vector]),
        ];
        for (query_type, complexity, entities, expected) in cases {
            let c = classification(query_type, complexity);
            assert_eq!(tags(s.select(QUERY, Some(&c), entities)), expected, "{query_type:?}/{complexity:?}/{entities}");
        }
    }
}
