//! Ordering scored candidates into a result.

use crate::types::ClassificationResult;

/// Indices of `scores`, highest score first.
///
/// The sort is stable, so candidates with identical scores keep their
/// input order. Uses IEEE total ordering: a positive NaN ranks above every
/// number, a negative NaN below every number.
pub fn argsort_descending(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

/// Pair candidates with their scores and sort them, highest first.
///
/// `scores` must be aligned with `candidates`.
pub fn rank<S: AsRef<str>>(text: &str, candidates: &[S], scores: &[f64]) -> ClassificationResult {
    debug_assert_eq!(candidates.len(), scores.len());

    let order = argsort_descending(scores);
    let labels = order
        .iter()
        .map(|&i| candidates[i].as_ref().to_string())
        .collect();
    let scores = order.iter().map(|&i| scores[i]).collect();

    ClassificationResult {
        text: text.to_string(),
        labels,
        scores,
    }
}
