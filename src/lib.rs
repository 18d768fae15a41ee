//! Mimir - zero-shot text classification over NLI models
//!
//! Each candidate label is turned into a hypothesis ("This example is
//! {label}."), an NLI backend scores the `(text, hypothesis)` pair, and the
//! entailment logits are normalised into ranked label scores. Which logit
//! column means entailment is read from the model's `config.json`.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use mimir::{NliBackend, ZeroShotClassifier};
//!
//! struct FixedLogits;
//!
//! #[async_trait]
//! impl NliBackend for FixedLogits {
//!     fn name(&self) -> &str {
//!         "fixed"
//!     }
//!
//!     async fn infer_logits(&self, _premise: &str, hypothesis: &str) -> mimir::Result<Vec<f32>> {
//!         let entailment = if hypothesis.contains("food") { 2.0 } else { 0.0 };
//!         Ok(vec![0.0, 0.0, entailment])
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> mimir::Result<()> {
//!     let classifier = ZeroShotClassifier::builder()
//!         .backend(Arc::new(FixedLogits))
//!         .build()?;
//!
//!     let result = classifier
//!         .classify("A man is eating pizza.", &["food", "travel"], "This example is {}.", false)
//!         .await?;
//!
//!     println!("{:?}", result.top());
//!     Ok(())
//! }
//! ```
//!
//! # Local models (requires `local-inference` feature)
//!
//! ```rust,ignore
//! use mimir::{ModelSource, ZeroShotClassifier};
//!
//! let classifier = ZeroShotClassifier::builder()
//!     .onnx(ModelSource::huggingface("cross-encoder/nli-deberta-v3-small"))
//!     .build()?;
//! ```

pub mod classifier;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod hypothesis;
#[cfg(feature = "local-inference")]
pub mod model;
pub mod providers;
pub mod ranking;
pub mod scoring;
pub mod telemetry;
pub mod tokenizer;
pub mod types;

// Re-export main types at crate root
pub use classifier::{ClassifierOptions, ZeroShotClassifier, ZeroShotClassifierBuilder};
pub use config::{ClassIndices, ModelConfig, ResolvedConfig};
pub use error::{MimirError, Result};
pub use providers::{NliBackend, TimeoutBackend};
pub use scoring::{LogitMatrix, ScoringPolicy};
pub use types::{ClassificationRequest, ClassificationResult};

#[cfg(feature = "local-inference")]
pub use model::{Device, ModelSource};
#[cfg(feature = "local-inference")]
pub use providers::OnnxNliBackend;
