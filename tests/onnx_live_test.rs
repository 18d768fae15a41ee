//! Live tests for local ONNX inference.
//!
//! These tests require a model download and execution.
//! Run with:
//! ```bash
//! cargo test --test onnx_live_test --features local-inference -- --ignored
//! ```

#![cfg(feature = "local-inference")]

use mimir::{Device, ModelSource, NliBackend, OnnxNliBackend, ResolvedConfig, ZeroShotClassifier};

const REPO: &str = "cross-encoder/nli-deberta-v3-small";

#[tokio::test]
#[ignore]
async fn test_live_backend_returns_three_logits() {
    let backend = OnnxNliBackend::new(
        &ModelSource::huggingface(REPO),
        Device::Cpu,
        ResolvedConfig::default(),
        false,
    )
    .expect("Failed to load model");

    // cross-encoder layout: contradiction, entailment, neutral
    let resolved = backend.resolved_config();
    assert_eq!(resolved.indices.entailment, 1);
    assert_eq!(resolved.indices.contradiction, 0);
    assert!(resolved.use_token_type);

    let logits = backend
        .infer_logits("The cat is on the mat.", "There is a cat.")
        .await
        .expect("Inference failed");
    assert_eq!(logits.len(), 3);
    assert!(logits[1] > logits[0]);
}

#[tokio::test]
#[ignore]
async fn test_live_zero_shot_classification() {
    let classifier = ZeroShotClassifier::builder()
        .onnx(ModelSource::huggingface(REPO))
        .build()
        .expect("Failed to build classifier");

    let result = classifier
        .classify(
            "A man is eating pizza.",
            &["food", "travel", "sports"],
            "This example is {}.",
            false,
        )
        .await
        .expect("Classification failed");

    assert_eq!(result.top().map(|(label, _)| label), Some("food"));
    let sum: f64 = result.scores.iter().sum();
    assert!((sum - 1.0).abs() < 1e-6);
}
