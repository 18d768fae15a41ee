//! Classification result type

use serde::{Deserialize, Serialize};

/// Ranked labels for one input text.
///
/// `labels[i]` and `scores[i]` belong together, highest score first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub text: String,
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl ClassificationResult {
    /// The best-scoring label.
    pub fn top(&self) -> Option<(&str, f64)> {
        self.iter().next()
    }

    /// `(label, score)` pairs in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.scores.iter().copied())
    }

    /// Score for a specific label.
    pub fn score_of(&self, label: &str) -> Option<f64> {
        self.iter().find(|(l, _)| *l == label).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
