//! Local NLI inference via ONNX Runtime.
//!
//! Runs a sequence-classification NLI export (`logits` output of shape
//! `[1, num_labels]`) and hands the raw row back to the classifier.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;
use tracing::debug;

use super::traits::{NliBackend, run_blocking};
use crate::config::ResolvedConfig;
use crate::error::{MimirError, Result};
use crate::model::{Device, ModelFiles, ModelSource, default_cache_dir};
use crate::tokenizer::{EncodedInput, EncodingOptions, HfPairEncoder, PairEncoder};

/// Local NLI backend using ONNX Runtime.
///
/// Session runs happen on tokio's blocking pool, so callers can put a
/// deadline around them.
pub struct OnnxNliBackend {
    name: String,
    runner: Arc<PairRunner>,
    resolved: ResolvedConfig,
    device: Device,
}

/// Everything a blocking session run needs.
struct PairRunner {
    session: Mutex<Session>,
    encoder: Box<dyn PairEncoder>,
    encoding: EncodingOptions,
}

impl PairRunner {
    fn infer(&self, premise: &str, hypothesis: &str) -> Result<Vec<f32>> {
        let input = self.encoder.encode_pair(premise, hypothesis, self.encoding)?;
        let mut session = self
            .session
            .lock()
            .map_err(|e| MimirError::Inference(format!("ONNX session lock poisoned: {}", e)))?;
        run_session(&mut session, &input)
    }
}

impl OnnxNliBackend {
    /// Load a model, downloading it if needed.
    ///
    /// Class indices and token-type usage come from the model's
    /// `config.json`, with `defaults` filling whatever it leaves out (or all
    /// of it, when the file is missing or malformed).
    pub fn new(
        source: &ModelSource,
        device: Device,
        defaults: ResolvedConfig,
        int32: bool,
    ) -> Result<Self> {
        let files = source.resolve(&default_cache_dir())?;
        let resolved = match &files.config {
            Some(path) => ResolvedConfig::from_config_file(path, defaults),
            None => {
                let dir = files.model.parent().unwrap_or_else(|| Path::new("."));
                ResolvedConfig::from_model_dir(dir, defaults)
            }
        };
        Self::from_files(source.name(), &files, device, resolved, int32)
    }

    /// Load a model with an already-resolved config, ignoring its `config.json`.
    pub fn with_config(
        source: &ModelSource,
        device: Device,
        resolved: ResolvedConfig,
        int32: bool,
    ) -> Result<Self> {
        let files = source.resolve(&default_cache_dir())?;
        Self::from_files(source.name(), &files, device, resolved, int32)
    }

    /// Load from already-located model files.
    pub fn from_files(
        name: impl Into<String>,
        files: &ModelFiles,
        device: Device,
        resolved: ResolvedConfig,
        int32: bool,
    ) -> Result<Self> {
        let session = build_session(&files.model, &device)?;
        let encoder = HfPairEncoder::from_file(&files.tokenizer)?;
        let name = name.into();

        debug!(
            model = %name,
            device = device.name(),
            entailment = resolved.indices.entailment,
            contradiction = resolved.indices.contradiction,
            use_token_type = resolved.use_token_type,
            int32,
            "loaded ONNX NLI model"
        );

        Ok(Self {
            name,
            runner: Arc::new(PairRunner {
                session: Mutex::new(session),
                encoder: Box::new(encoder),
                encoding: EncodingOptions::from_resolved(&resolved, int32),
            }),
            resolved,
            device,
        })
    }

    /// Class indices and token-type usage for this model.
    pub fn resolved_config(&self) -> ResolvedConfig {
        self.resolved
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Run the session on one premise/hypothesis pair, blocking the current thread.
    pub fn infer_blocking(&self, premise: &str, hypothesis: &str) -> Result<Vec<f32>> {
        self.runner.infer(premise, hypothesis)
    }
}

#[async_trait]
impl NliBackend for OnnxNliBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn infer_logits(&self, premise: &str, hypothesis: &str) -> Result<Vec<f32>> {
        let runner = Arc::clone(&self.runner);
        let premise = premise.to_owned();
        let hypothesis = hypothesis.to_owned();
        run_blocking(move || runner.infer(&premise, &hypothesis)).await
    }
}

/// Feed one encoded pair through the session, with or without token types.
macro_rules! run_pair {
    ($session:expr, $pair:expr) => {{
        let pair = $pair;
        let shape = [1_usize, pair.input_ids.len()];

        let input_ids = TensorRef::from_array_view((shape, pair.input_ids.as_slice()))
            .map_err(|e| tensor_error("input_ids", e))?;
        let attention_mask = TensorRef::from_array_view((shape, pair.attention_mask.as_slice()))
            .map_err(|e| tensor_error("attention_mask", e))?;

        let outputs = match &pair.token_type_ids {
            Some(type_ids) => {
                let token_type_ids = TensorRef::from_array_view((shape, type_ids.as_slice()))
                    .map_err(|e| tensor_error("token_type_ids", e))?;
                $session.run(ort::inputs![
                    "input_ids" => input_ids,
                    "attention_mask" => attention_mask,
                    "token_type_ids" => token_type_ids,
                ])
            }
            None => $session.run(ort::inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
            ]),
        }
        .map_err(|e| MimirError::Inference(format!("ONNX inference failed: {}", e)))?;

        let logits = outputs
            .get("logits")
            .ok_or_else(|| MimirError::DataError("No logits output found".to_string()))?;

        // try_extract_tensor returns (&Shape, &[T])
        let (shape, data) = logits
            .try_extract_tensor::<f32>()
            .map_err(|e| MimirError::DataError(format!("Failed to extract logits: {}", e)))?;

        first_row(&shape[..], data)
    }};
}

fn run_session(session: &mut Session, input: &EncodedInput) -> Result<Vec<f32>> {
    if input.is_empty() {
        return Err(MimirError::DataError("Tokenizer produced no tokens".to_string()));
    }
    match input {
        EncodedInput::I64(pair) => run_pair!(session, pair),
        EncodedInput::I32(pair) => run_pair!(session, pair),
    }
}

fn tensor_error(name: &str, e: impl std::fmt::Display) -> MimirError {
    MimirError::DataError(format!("Failed to create {} tensor: {}", name, e))
}

/// First row of a `[batch, num_labels]` (or `[num_labels]`) logits tensor.
fn first_row(dims: &[i64], data: &[f32]) -> Result<Vec<f32>> {
    let num_labels = match dims {
        [_, labels] | [labels] => *labels as usize,
        _ => {
            return Err(MimirError::ShapeMismatch(format!(
                "expected 1-D or 2-D logits, got {} dimensions",
                dims.len()
            )));
        }
    };
    if data.len() < num_labels {
        return Err(MimirError::ShapeMismatch(format!(
            "logits tensor holds {} values, expected {}",
            data.len(),
            num_labels
        )));
    }

    Ok(data[..num_labels].to_vec())
}

/// Build an ONNX session with the appropriate execution provider.
fn build_session(model_path: &Path, device: &Device) -> Result<Session> {
    let builder = Session::builder()
        .map_err(|e| MimirError::Configuration(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| MimirError::Configuration(format!("Failed to set optimization level: {}", e)))?;

    // Configure execution provider based on device
    let builder = match device {
        Device::Cpu => builder,
        #[cfg(feature = "cuda")]
        Device::Cuda { device_id } => {
            use ort::execution_providers::CUDAExecutionProvider;
            builder
                .with_execution_providers([CUDAExecutionProvider::default()
                    .with_device_id(*device_id as i32)
                    .build()])
                .map_err(|e| MimirError::Configuration(format!("Failed to configure CUDA: {}", e)))?
        }
    };

    builder
        .commit_from_file(model_path)
        .map_err(|e| MimirError::Configuration(format!("Failed to load ONNX model: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_row_of_batched_logits() {
        let row = first_row(&[1, 3], &[-1.0, 0.5, 2.0]).unwrap();
        assert_eq!(row, vec![-1.0, 0.5, 2.0]);
    }

    #[test]
    fn first_row_of_flat_logits() {
        assert_eq!(first_row(&[2], &[0.1, 0.9]).unwrap(), vec![0.1, 0.9]);
    }

    #[test]
    fn first_row_rejects_bad_shapes() {
        assert!(matches!(
            first_row(&[1, 1, 3], &[0.0; 3]),
            Err(MimirError::ShapeMismatch(_))
        ));
        assert!(matches!(
            first_row(&[1, 3], &[0.0; 2]),
            Err(MimirError::ShapeMismatch(_))
        ));
    }
}
