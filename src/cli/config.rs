//! Configuration loading for the `mimir` CLI.
//!
//! Settings are loaded from TOML with the following resolution order:
//! 1. `--config <path>` (CLI flag; must exist)
//! 2. `~/.mimir/config.toml` (user)
//! 3. built-in defaults
//!
//! ```toml
//! [classifier]
//! entailment_id = 2
//! contradiction_id = 0
//! multi_label = false
//! hypothesis_template = "This example is {}."
//! max_concurrency = 1
//!
//! [model]
//! repo_id = "cross-encoder/nli-deberta-v3-small"
//! device = "cpu"
//! timeout_secs = 30
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::classifier::ClassifierOptions;
use crate::{MimirError, Result};

/// CLI settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub classifier: ClassifierOptions,
    #[serde(default)]
    pub model: ModelSettings,
}

/// Which model to run and how.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    /// Local model directory. Takes precedence over `repo_id`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// HuggingFace repository holding an ONNX export.
    #[serde(default)]
    pub repo_id: Option<String>,
    /// Explicit `config.json`, overriding the one shipped with the model.
    #[serde(default)]
    pub config: Option<PathBuf>,
    /// Device to use: "cpu", "cuda" or "cuda:N" (default: "cpu").
    #[serde(default = "default_device")]
    pub device: String,
    /// Per-inference-call timeout in seconds; unset means no limit.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            dir: None,
            repo_id: None,
            config: None,
            device: default_device(),
            timeout_secs: None,
        }
    }
}

fn default_device() -> String {
    "cpu".to_string()
}

impl Settings {
    /// Load settings from the standard locations.
    ///
    /// An explicit path that does not exist is an error; with no explicit
    /// path and no user config, the defaults are returned.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MimirError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let settings: Self = toml::from_str(&content).map_err(|e| {
            MimirError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        settings.classifier.validate()?;
        Ok(settings)
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(MimirError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".mimir").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        Ok(None)
    }
}
