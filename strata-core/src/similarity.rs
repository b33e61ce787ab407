//! Vector similarity helpers shared by storage, hierarchy, and retrieval.

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths, empty input, or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }

    (dot / denom).clamp(-1.0, 1.0)
}

/// Jaccard overlap of the lowercase word sets of two texts.
pub fn word_jaccard(a: &str, b: &str) -> f64 {
    let words_a: std::collections::HashSet<String> =
        a.split_whitespace().map(|w| w.to_lowercase()).collect();
    let words_b: std::collections::HashSet<String> =
        b.split_whitespace().map(|w| w.to_lowercase()).collect();

    if words_a.is_empty() && words_b.is_empty() {
        return 0.0;
    }
    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f64 / union as f64
}

/// Element-wise mean of a set of equal-length vectors.
///
/// Vectors whose length differs from the first one are skipped.
pub fn centroid(vectors: &[&[f32]]) -> Option<Vec<f32>> {
    let first = vectors.first()?;
    let dims = first.len();
    if dims == 0 {
        return None;
    }
    let mut sum = vec![0.0f64; dims];
    let mut count = 0usize;
    for v in vectors.iter().filter(|v| v.len() == dims) {
        for (s, x) in sum.iter_mut().zip(v.iter()) {
            *s += *x as f64;
        }
        count += 1;
    }
    Some(sum.into_iter().map(|s| (s / count as f64) as f32).collect())
}
