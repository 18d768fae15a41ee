//! Immutable classifier settings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{ClassIndices, ResolvedConfig};
use crate::error::{MimirError, Result};
use crate::hypothesis::DEFAULT_TEMPLATE;

/// Settings a [`ZeroShotClassifier`](super::ZeroShotClassifier) is built with.
///
/// Class indices and `token_type_ids` here are *defaults*: a model's
/// `config.json` overrides them when it carries the information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierOptions {
    pub entailment_id: usize,
    pub contradiction_id: usize,
    pub token_type_ids: bool,
    /// Feed `int32` id tensors instead of `int64`.
    pub int32: bool,
    /// Template used when a call does not give its own.
    pub hypothesis_template: String,
    /// Multi-label default for calls that do not specify it.
    pub multi_label: bool,
    /// Maximum inference calls in flight per request. 1 = sequential.
    pub max_concurrency: usize,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        let indices = ClassIndices::default();
        Self {
            entailment_id: indices.entailment,
            contradiction_id: indices.contradiction,
            token_type_ids: false,
            int32: false,
            hypothesis_template: DEFAULT_TEMPLATE.to_string(),
            multi_label: false,
            max_concurrency: 1,
        }
    }
}

impl ClassifierOptions {
    /// Parse options from a generic argument map (e.g. model serving arguments).
    ///
    /// Recognised keys: `tokenTypeId`, `int32`, `entailmentId`,
    /// `contradictionId`, `hypothesisTemplate`, `multiLabel`,
    /// `maxConcurrency`. Booleans and integers may also be given as strings.
    /// Unknown keys are ignored; a recognised key with an unusable value is
    /// an [`MimirError::InvalidInput`].
    pub fn from_arguments(arguments: &HashMap<String, Value>) -> Result<Self> {
        let mut options = Self::default();

        if let Some(v) = arguments.get("tokenTypeId") {
            options.token_type_ids = parse_bool("tokenTypeId", v)?;
        }
        if let Some(v) = arguments.get("int32") {
            options.int32 = parse_bool("int32", v)?;
        }
        if let Some(v) = arguments.get("entailmentId") {
            options.entailment_id = parse_usize("entailmentId", v)?;
        }
        if let Some(v) = arguments.get("contradictionId") {
            options.contradiction_id = parse_usize("contradictionId", v)?;
        }
        if let Some(v) = arguments.get("hypothesisTemplate") {
            options.hypothesis_template = v
                .as_str()
                .ok_or_else(|| invalid("hypothesisTemplate", v))?
                .to_string();
        }
        if let Some(v) = arguments.get("multiLabel") {
            options.multi_label = parse_bool("multiLabel", v)?;
        }
        if let Some(v) = arguments.get("maxConcurrency") {
            options.max_concurrency = parse_usize("maxConcurrency", v)?;
        }

        options.validate()?;
        Ok(options)
    }

    /// Reject settings no classifier can run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(MimirError::InvalidInput(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Fallback used when the model config is missing or silent.
    pub fn defaults(&self) -> ResolvedConfig {
        ResolvedConfig {
            indices: ClassIndices::new(self.entailment_id, self.contradiction_id),
            use_token_type: self.token_type_ids,
        }
    }
}

fn invalid(key: &str, value: &Value) -> MimirError {
    MimirError::InvalidInput(format!("invalid value for '{}': {}", key, value))
}

fn parse_bool(key: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(invalid(key, value)),
        },
        _ => Err(invalid(key, value)),
    }
}

fn parse_usize(key: &str, value: &Value) -> Result<usize> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| invalid(key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_arguments_give_defaults() {
        let options = ClassifierOptions::from_arguments(&HashMap::new()).unwrap();
        assert_eq!(options, ClassifierOptions::default());
        assert_eq!(options.defaults(), ResolvedConfig::default());
    }

    #[test]
    fn parses_known_keys() {
        let options = ClassifierOptions::from_arguments(&args(json!({
            "tokenTypeId": true,
            "int32": "true",
            "entailmentId": 1,
            "contradictionId": "0",
            "hypothesisTemplate": "The topic is {}.",
            "multiLabel": false,
            "maxConcurrency": 4,
            "somethingElse": [1, 2, 3],
        })))
        .unwrap();

        assert!(options.token_type_ids);
        assert!(options.int32);
        assert_eq!(options.entailment_id, 1);
        assert_eq!(options.contradiction_id, 0);
        assert_eq!(options.hypothesis_template, "The topic is {}.");
        assert_eq!(options.max_concurrency, 4);
    }

    #[test]
    fn rejects_bad_values() {
        for bad in [
            json!({"tokenTypeId": "yes"}),
            json!({"entailmentId": -1}),
            json!({"entailmentId": 1.5}),
            json!({"hypothesisTemplate": 3}),
            json!({"maxConcurrency": 0}),
        ] {
            let err = ClassifierOptions::from_arguments(&args(bad.clone())).unwrap_err();
            assert!(matches!(err, MimirError::InvalidInput(_)), "{bad}");
        }
    }

    #[test]
    fn deserialize_partial_options() {
        let options: ClassifierOptions =
            serde_json::from_value(json!({"multi_label": true})).unwrap();
        assert!(options.multi_label);
        assert_eq!(options.entailment_id, 2);
        assert_eq!(options.hypothesis_template, DEFAULT_TEMPLATE);
    }
}
