//! Zero-shot classification over an NLI backend.
//!
//! For each candidate label a hypothesis is built from the template, the
//! backend scores `(text, hypothesis)`, and the stacked logits are turned
//! into ranked scores by [`scoring::score`] and [`ranking::rank`].

mod builder;
mod options;

pub use builder::ZeroShotClassifierBuilder;
pub use options::ClassifierOptions;

use std::sync::Arc;
use std::time::Instant;

use futures_util::{StreamExt, TryStreamExt, stream};
use tracing::{debug, instrument};

use crate::config::ResolvedConfig;
use crate::error::{MimirError, Result};
use crate::hypothesis::build_hypothesis;
use crate::providers::NliBackend;
use crate::ranking;
use crate::scoring::{self, LogitMatrix, ScoringPolicy};
use crate::telemetry;
use crate::types::{ClassificationRequest, ClassificationResult};

/// A configured zero-shot classifier.
///
/// Cheap to share: the resolved config and options are immutable after
/// construction, so one instance can serve concurrent requests.
pub struct ZeroShotClassifier {
    backend: Arc<dyn NliBackend>,
    resolved: ResolvedConfig,
    options: ClassifierOptions,
}

impl ZeroShotClassifier {
    pub fn builder() -> ZeroShotClassifierBuilder {
        ZeroShotClassifierBuilder::new()
    }

    /// Create a classifier from an already-resolved config.
    pub fn new(
        backend: Arc<dyn NliBackend>,
        resolved: ResolvedConfig,
        options: ClassifierOptions,
    ) -> Self {
        Self {
            backend,
            resolved,
            options,
        }
    }

    pub fn resolved_config(&self) -> ResolvedConfig {
        self.resolved
    }

    pub fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Classify `text` against `candidates`.
    ///
    /// With `multi_label` (or a single candidate) every label is scored on
    /// its own; otherwise scores are normalised across candidates. Backend
    /// errors are returned unchanged.
    #[instrument(
        skip(self, text, candidates, template),
        fields(backend = self.backend.name(), candidates = candidates.len())
    )]
    pub async fn classify<S: AsRef<str> + Sync>(
        &self,
        text: &str,
        candidates: &[S],
        template: &str,
        multi_label: bool,
    ) -> Result<ClassificationResult> {
        if candidates.is_empty() {
            return Err(MimirError::InvalidInput(
                "at least one candidate label is required".to_string(),
            ));
        }

        let start = Instant::now();
        let policy = ScoringPolicy::select(multi_label, candidates.len());
        debug!(policy = policy.as_str(), "classifying");
        let result = self.run(text, candidates, template, multi_label).await;
        self.record_request(policy, start, result.is_ok());
        result
    }

    /// Classify using the options' template and multi-label default.
    pub async fn classify_with_defaults<S: AsRef<str> + Sync>(
        &self,
        text: &str,
        candidates: &[S],
    ) -> Result<ClassificationResult> {
        self.classify(
            text,
            candidates,
            &self.options.hypothesis_template,
            self.options.multi_label,
        )
        .await
    }

    pub async fn classify_request(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResult> {
        self.classify(
            &request.text,
            &request.candidates,
            &request.hypothesis_template,
            request.multi_label,
        )
        .await
    }

    /// Score and rank precomputed logits with this classifier's class indices.
    pub fn rank_logits<S: AsRef<str>>(
        &self,
        text: &str,
        candidates: &[S],
        logits: &LogitMatrix,
        multi_label: bool,
    ) -> Result<ClassificationResult> {
        rank_logits(self.resolved, text, candidates, logits, multi_label)
    }

    async fn run<S: AsRef<str> + Sync>(
        &self,
        text: &str,
        candidates: &[S],
        template: &str,
        multi_label: bool,
    ) -> Result<ClassificationResult> {
        let hypotheses: Vec<String> = candidates
            .iter()
            .map(|c| build_hypothesis(template, c.as_ref()))
            .collect();

        let rows = self.infer_all(text, &hypotheses).await?;
        if rows.len() != candidates.len() {
            return Err(MimirError::ShapeMismatch(format!(
                "backend returned {} logit rows for {} candidates",
                rows.len(),
                candidates.len()
            )));
        }

        let logits = LogitMatrix::from_rows(&rows)?;
        debug!(
            rows = logits.num_rows(),
            classes = logits.num_classes(),
            "collected logits"
        );
        rank_logits(self.resolved, text, candidates, &logits, multi_label)
    }

    /// One logit row per hypothesis, in hypothesis order.
    async fn infer_all(&self, text: &str, hypotheses: &[String]) -> Result<Vec<Vec<f32>>> {
        metrics::counter!(telemetry::INFERENCE_CALLS_TOTAL,
            "backend" => self.backend.name().to_owned(),
        )
        .increment(hypotheses.len() as u64);

        if self.options.max_concurrency <= 1 {
            let pairs: Vec<(&str, &str)> =
                hypotheses.iter().map(|h| (text, h.as_str())).collect();
            return self.backend.infer_logits_batch(&pairs).await;
        }

        stream::iter(hypotheses)
            .map(|hypothesis| self.backend.infer_logits(text, hypothesis))
            .buffered(self.options.max_concurrency)
            .try_collect()
            .await
    }

    fn record_request(&self, policy: ScoringPolicy, start: Instant, ok: bool) {
        let status = if ok { "ok" } else { "error" };
        let elapsed = start.elapsed().as_secs_f64();
        metrics::counter!(telemetry::CLASSIFY_REQUESTS_TOTAL,
            "backend" => self.backend.name().to_owned(),
            "policy" => policy.as_str(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::CLASSIFY_DURATION_SECONDS,
            "backend" => self.backend.name().to_owned(),
            "policy" => policy.as_str(),
        )
        .record(elapsed);
    }
}

/// Score a logit matrix and rank the candidates, no backend involved.
///
/// `candidates` must line up with the matrix rows.
pub fn rank_logits<S: AsRef<str>>(
    resolved: ResolvedConfig,
    text: &str,
    candidates: &[S],
    logits: &LogitMatrix,
    multi_label: bool,
) -> Result<ClassificationResult> {
    if logits.num_rows() != candidates.len() {
        return Err(MimirError::ShapeMismatch(format!(
            "{} logit rows for {} candidates",
            logits.num_rows(),
            candidates.len()
        )));
    }
    let scores = scoring::score(logits, resolved.indices, multi_label)?;
    Ok(ranking::rank(text, candidates, &scores))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassIndices;

    #[test]
    fn rank_logits_exclusive() {
        let logits = LogitMatrix::from_rows([[0.0f32, 0.0, 2.0], [0.0, 0.0, 0.0]]).unwrap();
        let result = rank_logits(
            ResolvedConfig::default(),
            "text",
            &["a", "b"],
            &logits,
            false,
        )
        .unwrap();

        assert_eq!(result.labels, vec!["a", "b"]);
        let sum: f64 = result.scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rank_logits_rejects_misaligned_candidates() {
        let logits = LogitMatrix::from_rows([[0.0f32, 1.0]]).unwrap();
        let err = rank_logits(
            ResolvedConfig::default(),
            "text",
            &["a", "b"],
            &logits,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, MimirError::ShapeMismatch(_)));
    }

    #[test]
    fn rank_logits_uses_given_indices() {
        let resolved = ResolvedConfig {
            indices: ClassIndices::new(1, 0),
            use_token_type: false,
        };
        let logits = LogitMatrix::from_rows([[3.0f32, 0.0], [0.0, 3.0]]).unwrap();
        let result = rank_logits(resolved, "text", &["x", "y"], &logits, true).unwrap();
        assert_eq!(result.top().map(|(l, _)| l), Some("y"));
    }
}
