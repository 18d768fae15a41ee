//! Model configuration and class-index resolution.
//!
//! NLI checkpoints disagree on column order: MNLI-style heads put
//! entailment last, cross-encoders put it in the middle, binary heads have
//! no contradiction column at all. The model's `config.json` usually says
//! which is which through `label2id`; this module turns that document into
//! a [`ResolvedConfig`] once per model load.
//!
//! Resolution never fails. A missing or malformed document is logged and
//! the caller's defaults are kept.

mod rules;

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{MimirError, Result};
use crate::telemetry;

pub use rules::{ClassRole, resolve};

/// File name conventionally stored next to the model weights.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// The subset of a HuggingFace `config.json` used for classification.
///
/// Fields are kept as raw JSON values so that one odd field (a string
/// `type_vocab_size`, a float in `label2id`) degrades only that field
/// instead of rejecting the whole document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    /// Label name → class index, in document order.
    #[serde(default)]
    pub label2id: Option<serde_json::Map<String, Value>>,
    /// Number of token-type (segment) embeddings.
    #[serde(default)]
    pub type_vocab_size: Option<Value>,
    /// Architecture family, e.g. `"bert"` or `"deberta-v2"`.
    #[serde(default)]
    pub model_type: Option<Value>,
}

impl ModelConfig {
    /// Parse a config document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MimirError::ConfigParse(e.to_string()))
    }

    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MimirError::ConfigParse(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content).map_err(|e| match e {
            MimirError::ConfigParse(msg) => {
                MimirError::ConfigParse(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// `label2id` entries whose value is a non-negative integer, in document order.
    ///
    /// Entries with any other value are skipped with a warning.
    pub fn label_ids(&self) -> Vec<(&str, usize)> {
        let Some(map) = &self.label2id else {
            return Vec::new();
        };

        map.iter()
            .filter_map(|(label, value)| match as_integer(value) {
                Some(id) if id >= 0 => Some((label.as_str(), id as usize)),
                _ => {
                    warn!(label = %label, value = %value, "ignoring non-integer label2id entry");
                    None
                }
            })
            .collect()
    }

    /// `type_vocab_size` as an integer, if present and numeric.
    pub fn type_vocab_size(&self) -> Option<i64> {
        self.type_vocab_size.as_ref().and_then(as_integer)
    }

    /// `model_type`, if present and a string.
    pub fn model_type(&self) -> Option<&str> {
        self.model_type.as_ref().and_then(Value::as_str)
    }
}

/// Accepts JSON integers and integer strings (`"3"`), as HF configs contain both.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Column indices of the entailment and contradiction classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct ClassIndices {
    pub entailment: usize,
    pub contradiction: usize,
}

impl ClassIndices {
    pub fn new(entailment: usize, contradiction: usize) -> Self {
        Self {
            entailment,
            contradiction,
        }
    }

    /// Index for the given role.
    pub fn get(&self, role: ClassRole) -> usize {
        match role {
            ClassRole::Entailment => self.entailment,
            ClassRole::Contradiction => self.contradiction,
        }
    }

    pub(crate) fn set(&mut self, role: ClassRole, index: usize) {
        match role {
            ClassRole::Entailment => self.entailment = index,
            ClassRole::Contradiction => self.contradiction = index,
        }
    }
}

impl Default for ClassIndices {
    /// MNLI column order: contradiction, neutral, entailment.
    fn default() -> Self {
        Self::new(2, 0)
    }
}

/// Everything classification needs to know about a model.
///
/// Read-only after resolution; share it freely across requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub indices: ClassIndices,
    /// Whether encoded inputs should carry `token_type_ids`.
    pub use_token_type: bool,
}

impl ResolvedConfig {
    /// Resolve from a config file, keeping `defaults` if it is missing or malformed.
    pub fn from_config_file(path: &Path, defaults: ResolvedConfig) -> Self {
        if !path.is_file() {
            warn!(path = %path.display(), "model config not found, using defaults");
            metrics::counter!(telemetry::CONFIG_FALLBACKS_TOTAL, "reason" => "missing")
                .increment(1);
            return defaults;
        }

        match ModelConfig::from_file(path) {
            Ok(config) => {
                let resolved = resolve(&config, defaults);
                debug!(
                    path = %path.display(),
                    entailment = resolved.indices.entailment,
                    contradiction = resolved.indices.contradiction,
                    use_token_type = resolved.use_token_type,
                    "resolved model config"
                );
                resolved
            }
            Err(e) => {
                warn!(error = %e, "failed to parse model config, using defaults");
                metrics::counter!(telemetry::CONFIG_FALLBACKS_TOTAL, "reason" => "malformed")
                    .increment(1);
                defaults
            }
        }
    }

    /// Resolve from `config.json` inside a model directory.
    pub fn from_model_dir(dir: &Path, defaults: ResolvedConfig) -> Self {
        Self::from_config_file(&dir.join(CONFIG_FILE_NAME), defaults)
    }
}
