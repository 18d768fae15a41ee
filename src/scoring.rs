//! Entailment scoring over stacked NLI logits.
//!
//! One row per candidate label, one column per NLI class. Two policies turn
//! the matrix into per-candidate scores:
//!
//! - [`ScoringPolicy::Independent`]: every candidate is judged on its own,
//!   entailment vs. contradiction (or entailment vs. not-entailment for
//!   binary heads). Scores are each in `[0, 1]` and need not sum to 1.
//! - [`ScoringPolicy::Exclusive`]: candidates compete; the entailment
//!   logits of all rows are normalised against each other and sum to 1.

use crate::config::{ClassIndices, ClassRole};
use crate::error::{MimirError, Result};

/// Dense `[candidates, classes]` logit matrix in candidate order.
#[derive(Debug, Clone, PartialEq)]
pub struct LogitMatrix {
    data: Vec<f32>,
    rows: usize,
    width: usize,
}

impl LogitMatrix {
    /// Stack per-candidate logit rows.
    ///
    /// Every row must have the same width, and that width must be at least
    /// 2. Zero rows produce an empty matrix, which [`score`] rejects.
    pub fn from_rows<R: AsRef<[f32]>>(rows: impl IntoIterator<Item = R>) -> Result<Self> {
        let mut data = Vec::new();
        let mut width = None;
        let mut count = 0;

        for row in rows {
            let row = row.as_ref();
            match width {
                None => {
                    if row.len() < 2 {
                        return Err(MimirError::ShapeMismatch(format!(
                            "expected at least 2 classes per row, got {}",
                            row.len()
                        )));
                    }
                    width = Some(row.len());
                }
                Some(w) if w != row.len() => {
                    return Err(MimirError::ShapeMismatch(format!(
                        "row {} has {} classes, expected {}",
                        count,
                        row.len(),
                        w
                    )));
                }
                Some(_) => {}
            }
            data.extend_from_slice(row);
            count += 1;
        }

        Ok(Self {
            data,
            rows: count,
            width: width.unwrap_or(0),
        })
    }

    /// Number of candidates.
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of NLI classes per row.
    pub fn num_classes(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Logits for one candidate.
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        (index < self.rows).then(|| &self.data[index * self.width..(index + 1) * self.width])
    }

    /// Iterate rows in candidate order.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        // `max(1)` keeps `chunks_exact` valid for the empty matrix.
        self.data.chunks_exact(self.width.max(1))
    }

    fn check_index(&self, role: ClassRole, index: usize) -> Result<()> {
        if index >= self.width {
            return Err(MimirError::IndexOutOfRange {
                role: role.as_str(),
                index,
                width: self.width,
            });
        }
        Ok(())
    }
}

/// How candidate scores relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringPolicy {
    /// Each candidate scored on its own (multi-label, or a single candidate).
    Independent,
    /// Candidates share one probability mass (single-label).
    Exclusive,
}

impl ScoringPolicy {
    /// A single candidate is always scored independently: normalising one
    /// value against itself would always yield 1.
    pub fn select(multi_label: bool, num_candidates: usize) -> Self {
        if multi_label || num_candidates == 1 {
            Self::Independent
        } else {
            Self::Exclusive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Independent => "independent",
            Self::Exclusive => "exclusive",
        }
    }
}

/// Numerically stable softmax.
///
/// The maximum is subtracted before exponentiating, so large logits do not
/// overflow. `+inf` entries share all the mass equally; a row of only
/// `-inf` comes out uniform. NaN inputs propagate.
pub fn softmax(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::INFINITY {
        let count = values.iter().filter(|&&v| v == f64::INFINITY).count() as f64;
        return values
            .iter()
            .map(|&v| if v == f64::INFINITY { 1.0 / count } else { 0.0 })
            .collect();
    }
    if !values.is_empty() && values.iter().all(|&v| v == f64::NEG_INFINITY) {
        return vec![1.0 / values.len() as f64; values.len()];
    }
    let exps: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Entailment probability of one row, judged independently.
fn independent_score(row: &[f32], indices: ClassIndices) -> f64 {
    if row.len() == 2 {
        let probs = softmax(&[f64::from(row[0]), f64::from(row[1])]);
        probs[indices.entailment]
    } else {
        // Neutral is dropped before normalising, not merely down-weighted.
        let pair = [
            f64::from(row[indices.contradiction]),
            f64::from(row[indices.entailment]),
        ];
        softmax(&pair)[1]
    }
}

/// Score every candidate, returning scores in candidate order.
///
/// Fails with [`MimirError::InvalidInput`] on an empty matrix and with
/// [`MimirError::IndexOutOfRange`] when either class index does not fit the
/// row width. Indices are never clamped.
pub fn score(logits: &LogitMatrix, indices: ClassIndices, multi_label: bool) -> Result<Vec<f64>> {
    if logits.is_empty() {
        return Err(MimirError::InvalidInput("no candidates to score".to_string()));
    }
    logits.check_index(ClassRole::Entailment, indices.entailment)?;
    logits.check_index(ClassRole::Contradiction, indices.contradiction)?;

    let scores = match ScoringPolicy::select(multi_label, logits.num_rows()) {
        ScoringPolicy::Independent => logits
            .rows()
            .map(|row| independent_score(row, indices))
            .collect(),
        ScoringPolicy::Exclusive => {
            let entailment: Vec<f64> = logits
                .rows()
                .map(|row| f64::from(row[indices.entailment]))
                .collect();
            softmax(&entailment)
        }
    };

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MNLI: ClassIndices = ClassIndices {
        entailment: 2,
        contradiction: 0,
    };

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_softmax() {
        let probs = softmax(&[1.0, 2.0, 3.0]);

        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);

        assert!(probs[2] > probs[1]);
        assert!(probs[1] > probs[0]);
    }

    #[test]
    fn softmax_survives_large_logits() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!(approx(probs[0], 0.5));
        assert!(approx(probs[1], 0.5));

        let probs = softmax(&[-1000.0, 0.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn softmax_gives_infinite_logits_all_the_mass() {
        assert_eq!(softmax(&[f64::INFINITY, 0.0]), vec![1.0, 0.0]);
        assert_eq!(
            softmax(&[f64::INFINITY, 3.0, f64::INFINITY]),
            vec![0.5, 0.0, 0.5]
        );
        assert_eq!(softmax(&[f64::NEG_INFINITY, 0.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn softmax_of_all_negative_infinity_is_uniform() {
        assert_eq!(
            softmax(&[f64::NEG_INFINITY, f64::NEG_INFINITY]),
            vec![0.5, 0.5]
        );
        assert!(softmax(&[]).is_empty());
    }

    #[test]
    fn infinite_logits_keep_scores_bounded() {
        let logits = LogitMatrix::from_rows([
            [f32::NEG_INFINITY, 0.0, f32::INFINITY],
            [0.0, 0.0, f32::NEG_INFINITY],
            [f32::NEG_INFINITY, 0.0, f32::NEG_INFINITY],
        ])
        .unwrap();

        let independent = score(&logits, MNLI, true).unwrap();
        assert_eq!(independent, vec![1.0, 0.0, 0.5]);

        let exclusive = score(&logits, MNLI, false).unwrap();
        assert_eq!(exclusive, vec![1.0, 0.0, 0.0]);
        assert!(exclusive.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let err = LogitMatrix::from_rows([vec![0.0f32, 1.0, 2.0], vec![0.0, 1.0]]).unwrap_err();
        assert!(matches!(err, MimirError::ShapeMismatch(_)));
    }

    #[test]
    fn from_rows_rejects_single_class_heads() {
        let err = LogitMatrix::from_rows([vec![0.5f32]]).unwrap_err();
        assert!(matches!(err, MimirError::ShapeMismatch(_)));
    }

    #[test]
    fn matrix_accessors() {
        let matrix = LogitMatrix::from_rows([[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(matrix.num_rows(), 2);
        assert_eq!(matrix.num_classes(), 3);
        assert_eq!(matrix.row(1), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(matrix.row(2), None);
        assert_eq!(matrix.rows().count(), 2);
    }

    #[test]
    fn empty_matrix_is_invalid_input() {
        let matrix = LogitMatrix::from_rows(Vec::<Vec<f32>>::new()).unwrap();
        assert!(matrix.is_empty());
        assert_eq!(matrix.rows().count(), 0);
        let err = score(&matrix, MNLI, false).unwrap_err();
        assert!(matches!(err, MimirError::InvalidInput(_)));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let matrix = LogitMatrix::from_rows([[0.1f32, 0.9], [0.3, 0.7]]).unwrap();
        let err = score(&matrix, MNLI, true).unwrap_err();
        assert!(matches!(
            err,
            MimirError::IndexOutOfRange {
                role: "entailment",
                index: 2,
                width: 2
            }
        ));

        let err = score(&matrix, ClassIndices::new(1, 5), false).unwrap_err();
        assert!(matches!(
            err,
            MimirError::IndexOutOfRange {
                role: "contradiction",
                ..
            }
        ));
    }

    #[test]
    fn policy_selection() {
        assert_eq!(ScoringPolicy::select(true, 3), ScoringPolicy::Independent);
        assert_eq!(ScoringPolicy::select(false, 1), ScoringPolicy::Independent);
        assert_eq!(ScoringPolicy::select(true, 1), ScoringPolicy::Independent);
        assert_eq!(ScoringPolicy::select(false, 2), ScoringPolicy::Exclusive);
    }

    #[test]
    fn independent_binary_head_uses_full_row() {
        let indices = ClassIndices::new(1, 0);
        let matrix = LogitMatrix::from_rows([[0.0f32, 0.0], [0.0, 2.0_f32.ln()]]).unwrap();
        let scores = score(&matrix, indices, true).unwrap();
        assert!(approx(scores[0], 0.5));
        assert!((scores[1] - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn independent_three_class_head_ignores_neutral() {
        // Neutral (index 1) is huge but must not affect the score.
        let matrix = LogitMatrix::from_rows([[0.0f32, 50.0, 0.0]]).unwrap();
        let scores = score(&matrix, MNLI, false).unwrap();
        assert!(approx(scores[0], 0.5));
    }

    #[test]
    fn independent_scores_are_bounded() {
        let matrix = LogitMatrix::from_rows([
            [-80.0f32, 3.0, 80.0],
            [80.0, 0.0, -80.0],
            [0.0, 0.0, 0.0],
        ])
        .unwrap();
        for s in score(&matrix, MNLI, true).unwrap() {
            assert!((0.0..=1.0).contains(&s), "{s}");
        }
    }

    #[test]
    fn exclusive_scores_sum_to_one() {
        let matrix = LogitMatrix::from_rows([
            [0.2f32, 0.1, 1.5],
            [1.0, 0.0, -0.5],
            [0.0, 3.0, 0.7],
        ])
        .unwrap();
        let scores = score(&matrix, MNLI, false).unwrap();
        let sum: f64 = scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(scores[0] > scores[2] && scores[2] > scores[1]);
    }

    #[test]
    fn exclusive_uses_only_entailment_column() {
        let a = LogitMatrix::from_rows([[9.0f32, -3.0, 1.0], [-9.0, 4.0, 1.0]]).unwrap();
        let scores = score(&a, MNLI, false).unwrap();
        assert!(approx(scores[0], 0.5));
        assert!(approx(scores[1], 0.5));
    }

    #[test]
    fn exclusive_binary_head_recovers_probabilities() {
        let indices = ClassIndices::new(1, 0);
        let matrix =
            LogitMatrix::from_rows([[0.0f32, 0.9_f32.ln()], [0.0, 0.1_f32.ln()]]).unwrap();
        let scores = score(&matrix, indices, false).unwrap();
        assert!((scores[0] - 0.9).abs() < 1e-6);
        assert!((scores[1] - 0.1).abs() < 1e-6);
    }
}
