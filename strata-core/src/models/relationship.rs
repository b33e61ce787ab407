use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A weighted, typed edge between two entities.
///
/// Stored directed; clustering treats it as undirected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: String,
    /// In `(0, 1]`. Zero-weight edges are never stored.
    pub weight: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
}

impl Relationship {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relationship_type: impl Into<String>,
        weight: f64,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relationship_type: relationship_type.into(),
            weight,
            description: None,
            valid_from: None,
            valid_until: None,
        }
    }

    pub fn with_validity(
        mut self,
        valid_from: Option<DateTime<Utc>>,
        valid_until: Option<DateTime<Utc>>,
    ) -> Self {
        self.valid_from = valid_from;
        self.valid_until = valid_until;
        self
    }

    /// Whether the relationship holds at `at`. Open bounds always match.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        let started = self.valid_from.map_or(true, |from| from <= at);
        let not_ended = self.valid_until.map_or(true, |until| at < until);
        started && not_ended
    }

    /// The endpoint opposite to `entity_id`, if the relationship touches it.
    pub fn other_end(&self, entity_id: &str) -> Option<&str> {
        if self.source_id == entity_id {
            Some(&self.target_id)
        } else if self.target_id == entity_id {
            Some(&self.source_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn temporal_bounds_are_half_open() {
        let from = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let rel = Relationship::new("a", "b", "works_at", 0.5).with_validity(Some(from), Some(until));

        assert!(rel.is_active_at(from));
        assert!(!rel.is_active_at(until));
        assert!(!rel.is_active_at(from - chrono::Duration::days(1)));
        assert!(Relationship::new("a", "b", "x", 1.0).is_active_at(until));
    }

    #[test]
    fn other_end_either_direction() {
        let rel = Relationship::new("a", "b", "knows", 0.5);
        assert_eq!(rel.other_end("a"), Some("b"));
        assert_eq!(rel.other_end("b"), Some("a"));
        assert_eq!(rel.other_end("c"), None);
    }
}
