//! Weighted linear fusion of max-normalized score lists.

use std::collections::HashMap;

/// Each list is divided by its own maximum score, multiplied by its weight, and
/// summed per id. Lists whose maximum is not positive contribute nothing.
pub fn fuse(weighted_lists: &[(&[(String, f64)], f64)]) -> Vec<(String, f64)> {
    let mut scores: HashMap<String, f64> = HashMap::new();
    for (list, weight) in weighted_lists {
        let max = list.iter().map(|(_, s)| *s).fold(f64::NEG_INFINITY, f64::max);
        for (id, score) in list.iter() {
            let normalized = if max > 0.0 { (score / max).max(0.0) } else { 0.0 };
            *scores.entry(id.clone()).or_default() += weight * normalized;
        }
    }
    super::sorted(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_normalized_before_weighting() {
        let lexical = vec![("a".to_string(), 12.0), ("b".to_string(), 6.0)];
        let vector = vec![("b".to_string(), 0.9), ("c".to_string(), 0.45)];
        let fused = fuse(&[(&lexical, 0.3), (&vector, 0.7)]);

        let score = |id: &str| fused.iter().find(|(i, _)| i == id).unwrap().1;
        assert!((score("a") - 0.3).abs() < 1e-12);
        assert!((score("b") - (0.15 + 0.7)).abs() < 1e-12);
        assert!((score("c") - 0.35).abs() < 1e-12);
        assert_eq!(fused[0].0, "b");
    }
}
