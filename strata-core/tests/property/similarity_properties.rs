use proptest::prelude::*;

use strata_core::similarity::{centroid, cosine_similarity, word_jaccard};

fn vector(dims: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-10.0f32..10.0, dims)
}

proptest! {
    #[test]
    fn cosine_is_bounded_and_symmetric((a, b) in (1usize..32).prop_flat_map(|d| (vector(d), vector(d)))) {
        let ab = cosine_similarity(&a, &b);
        prop_assert!((-1.0..=1.0).contains(&ab));
        prop_assert!((ab - cosine_similarity(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn cosine_of_scaled_copy_is_one(a in vector(8), scale in 0.1f32..5.0) {
        prop_assume!(a.iter().any(|x| x.abs() > 1e-3));
        let scaled: Vec<f32> = a.iter().map(|x| x * scale).collect();
        prop_assert!((cosine_similarity(&a, &scaled) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn jaccard_is_bounded_and_case_insensitive(a in "[a-zA-Z ]{0,40}", b in "[a-zA-Z ]{0,40}") {
        let j = word_jaccard(&a, &b);
        prop_assert!((0.0..=1.0).contains(&j));
        prop_assert_eq!(j, word_jaccard(&b.to_uppercase(), &a.to_lowercase()));
    }

    #[test]
    fn centroid_of_identical_vectors_is_that_vector(a in vector(6), n in 1usize..5) {
        let copies: Vec<&[f32]> = std::iter::repeat(a.as_slice()).take(n).collect();
        let mean = centroid(&copies).unwrap();
        for (m, x) in mean.iter().zip(&a) {
            prop_assert!((m - x).abs() < 1e-4);
        }
    }
}
