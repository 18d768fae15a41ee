//! Builder for configuring classifier instances

use std::path::PathBuf;
use std::sync::Arc;

use super::{ClassifierOptions, ZeroShotClassifier};
use crate::config::{self, ModelConfig, ResolvedConfig};
use crate::error::{MimirError, Result};
use crate::providers::NliBackend;

#[cfg(feature = "local-inference")]
use crate::model::{Device, ModelSource};
#[cfg(feature = "local-inference")]
use crate::providers::OnnxNliBackend;

/// Where class indices and token-type usage come from.
#[derive(Debug, Clone, Default)]
enum ConfigSource {
    /// Options alone, or the ONNX model's own `config.json`.
    #[default]
    Defaults,
    Document(ModelConfig),
    File(PathBuf),
    ModelDir(PathBuf),
}

impl ConfigSource {
    fn resolve(&self, defaults: ResolvedConfig) -> ResolvedConfig {
        match self {
            Self::Defaults => defaults,
            Self::Document(doc) => config::resolve(doc, defaults),
            Self::File(path) => ResolvedConfig::from_config_file(path, defaults),
            Self::ModelDir(dir) => ResolvedConfig::from_model_dir(dir, defaults),
        }
    }
}

/// Builder for [`ZeroShotClassifier`].
pub struct ZeroShotClassifierBuilder {
    backend: Option<Arc<dyn NliBackend>>,
    options: ClassifierOptions,
    config: ConfigSource,
    #[cfg(feature = "local-inference")]
    onnx_source: Option<ModelSource>,
    #[cfg(feature = "local-inference")]
    device: Device,
}

impl ZeroShotClassifierBuilder {
    pub fn new() -> Self {
        Self {
            backend: None,
            options: ClassifierOptions::default(),
            config: ConfigSource::Defaults,
            #[cfg(feature = "local-inference")]
            onnx_source: None,
            #[cfg(feature = "local-inference")]
            device: Device::default(),
        }
    }

    /// Use an existing NLI backend.
    pub fn backend(mut self, backend: Arc<dyn NliBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Replace all options at once.
    pub fn options(mut self, options: ClassifierOptions) -> Self {
        self.options = options;
        self
    }

    /// Default entailment column, used when the model config has none.
    pub fn entailment_id(mut self, index: usize) -> Self {
        self.options.entailment_id = index;
        self
    }

    /// Default contradiction column, used when the model config has none.
    pub fn contradiction_id(mut self, index: usize) -> Self {
        self.options.contradiction_id = index;
        self
    }

    /// Default token-type usage, used when there is no model config.
    pub fn token_type_ids(mut self, enabled: bool) -> Self {
        self.options.token_type_ids = enabled;
        self
    }

    pub fn int32(mut self, enabled: bool) -> Self {
        self.options.int32 = enabled;
        self
    }

    pub fn hypothesis_template(mut self, template: impl Into<String>) -> Self {
        self.options.hypothesis_template = template.into();
        self
    }

    pub fn multi_label(mut self, enabled: bool) -> Self {
        self.options.multi_label = enabled;
        self
    }

    /// Maximum inference calls in flight per request (default: 1).
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.options.max_concurrency = limit;
        self
    }

    /// Resolve class indices from an already-parsed model config.
    pub fn model_config(mut self, config: ModelConfig) -> Self {
        self.config = ConfigSource::Document(config);
        self
    }

    /// Resolve class indices from a `config.json` path.
    ///
    /// A missing or malformed file is not an error; the defaults are kept.
    pub fn model_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = ConfigSource::File(path.into());
        self
    }

    /// Resolve class indices from `config.json` inside a model directory.
    pub fn model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config = ConfigSource::ModelDir(dir.into());
        self
    }

    /// Run a local ONNX model instead of a caller-supplied backend.
    #[cfg(feature = "local-inference")]
    pub fn onnx(mut self, source: ModelSource) -> Self {
        self.onnx_source = Some(source);
        self
    }

    /// Set the device for local inference (default: CPU).
    #[cfg(feature = "local-inference")]
    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Build the classifier.
    ///
    /// Fails if the options are invalid or no backend was configured.
    pub fn build(self) -> Result<ZeroShotClassifier> {
        self.options.validate()?;
        let defaults = self.options.defaults();

        #[cfg(feature = "local-inference")]
        if let Some(source) = &self.onnx_source {
            if self.backend.is_some() {
                return Err(MimirError::Configuration(
                    "configure either an ONNX model or a backend, not both".to_string(),
                ));
            }
            let backend = match &self.config {
                ConfigSource::Defaults => {
                    OnnxNliBackend::new(source, self.device, defaults, self.options.int32)?
                }
                explicit => OnnxNliBackend::with_config(
                    source,
                    self.device,
                    explicit.resolve(defaults),
                    self.options.int32,
                )?,
            };
            let resolved = backend.resolved_config();
            return Ok(ZeroShotClassifier::new(
                Arc::new(backend),
                resolved,
                self.options,
            ));
        }

        let backend = self.backend.ok_or_else(|| {
            MimirError::Configuration("no NLI backend configured".to_string())
        })?;
        let resolved = self.config.resolve(defaults);

        Ok(ZeroShotClassifier::new(backend, resolved, self.options))
    }
}

impl Default for ZeroShotClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}
