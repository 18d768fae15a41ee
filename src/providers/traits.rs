//! The inference seam between the classifier and an NLI model.
//!
//! A backend takes a premise/hypothesis pair and returns the model's raw
//! logit row (2 or 3 values, depending on the head). It knows nothing about
//! candidate labels, templates or scoring; those live in
//! [`ZeroShotClassifier`](crate::ZeroShotClassifier).
//!
//! Backends are passed in explicitly, so the classifier can be driven by a
//! real ONNX session or by a mock that returns synthetic logits.
//!
//! # Example
//!
//! ```ignore
//! struct FixedLogits;
//!
//! #[async_trait]
//! impl NliBackend for FixedLogits {
//!     fn name(&self) -> &str {
//!         "fixed"
//!     }
//!
//!     async fn infer_logits(&self, _premise: &str, _hypothesis: &str) -> Result<Vec<f32>> {
//!         Ok(vec![-1.0, 0.0, 2.0])
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::{MimirError, Result};

/// Provider of raw NLI logits.
///
/// Errors are returned to the caller unchanged; the classifier never
/// retries.
#[async_trait]
pub trait NliBackend: Send + Sync {
    /// Backend name for logging/metrics.
    fn name(&self) -> &str;

    /// Raw logits for one premise/hypothesis pair.
    async fn infer_logits(&self, premise: &str, hypothesis: &str) -> Result<Vec<f32>>;

    /// Raw logits for several pairs, in input order.
    ///
    /// Default implementation calls `infer_logits` sequentially.
    async fn infer_logits_batch(&self, pairs: &[(&str, &str)]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(pairs.len());
        for (premise, hypothesis) in pairs {
            results.push(self.infer_logits(premise, hypothesis).await?);
        }
        Ok(results)
    }
}

#[async_trait]
impl<T: NliBackend + ?Sized> NliBackend for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn infer_logits(&self, premise: &str, hypothesis: &str) -> Result<Vec<f32>> {
        (**self).infer_logits(premise, hypothesis).await
    }

    async fn infer_logits_batch(&self, pairs: &[(&str, &str)]) -> Result<Vec<Vec<f32>>> {
        (**self).infer_logits_batch(pairs).await
    }
}

/// Run synchronous inference on tokio's blocking pool.
///
/// Backends whose model call blocks the thread go through here, so the
/// calling task keeps yielding and deadlines around it can fire. A panic in
/// `f` surfaces as [`MimirError::Inference`].
pub async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| MimirError::Inference(format!("blocking inference task failed: {}", e)))?
}
