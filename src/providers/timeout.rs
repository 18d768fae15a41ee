//! Per-call deadline for NLI backends.
//!
//! The classifier does not cancel inference on its own. Callers that need a
//! bound wrap their backend in [`TimeoutBackend`]; a call that exceeds the
//! deadline fails with [`MimirError::Timeout`] and is not retried.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::traits::NliBackend;
use crate::{MimirError, Result};

/// Decorator that bounds every inference call with a deadline.
pub struct TimeoutBackend<B> {
    inner: B,
    timeout: Duration,
}

impl<B: NliBackend> TimeoutBackend<B> {
    /// Wrap a backend with a per-call timeout.
    pub fn new(inner: B, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<B: NliBackend> NliBackend for TimeoutBackend<B> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn infer_logits(&self, premise: &str, hypothesis: &str) -> Result<Vec<f32>> {
        match tokio::time::timeout(self.timeout, self.inner.infer_logits(premise, hypothesis))
            .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    backend = self.inner.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "inference call timed out"
                );
                Err(MimirError::Timeout(self.timeout))
            }
        }
    }
}
