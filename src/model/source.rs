//! Model source and download logic.

use crate::config::CONFIG_FILE_NAME;
use crate::error::{MimirError, Result};
use std::path::{Path, PathBuf};

use tracing::warn;

/// ONNX graph locations tried inside a model directory or repo, in order.
const ONNX_CANDIDATES: &[&str] = &["model.onnx", "onnx/model.onnx"];
const TOKENIZER_FILE_NAME: &str = "tokenizer.json";

/// Source for an NLI model.
#[derive(Debug, Clone)]
pub enum ModelSource {
    /// Load from HuggingFace Hub repository.
    HuggingFace {
        /// Repository ID (e.g., "cross-encoder/nli-deberta-v3-small").
        repo_id: String,
    },

    /// Load from a local directory holding the ONNX graph, tokenizer and config.
    Local {
        /// Path to the model directory.
        dir: PathBuf,
    },
}

/// Files needed to run a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
    /// `config.json`, when the source has one.
    pub config: Option<PathBuf>,
}

impl ModelSource {
    /// Create a HuggingFace source.
    pub fn huggingface(repo_id: impl Into<String>) -> Self {
        Self::HuggingFace {
            repo_id: repo_id.into(),
        }
    }

    /// Create a local source.
    pub fn local(dir: impl Into<PathBuf>) -> Self {
        Self::Local { dir: dir.into() }
    }

    /// Name for logging and metrics.
    pub fn name(&self) -> String {
        match self {
            Self::HuggingFace { repo_id } => repo_id.clone(),
            Self::Local { dir } => dir
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("local")
                .to_string(),
        }
    }

    /// Download or locate the model files.
    ///
    /// A missing `config.json` is not an error; classification then runs on
    /// the builder's defaults.
    pub fn resolve(&self, cache_dir: &Path) -> Result<ModelFiles> {
        match self {
            Self::HuggingFace { repo_id } => resolve_hub(repo_id, cache_dir),
            Self::Local { dir } => resolve_local(dir),
        }
    }
}

fn resolve_local(dir: &Path) -> Result<ModelFiles> {
    if !dir.is_dir() {
        return Err(MimirError::Configuration(format!(
            "Local model directory does not exist: {}",
            dir.display()
        )));
    }

    let model = ONNX_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| {
            MimirError::Configuration(format!("No ONNX model found in {}", dir.display()))
        })?;

    let tokenizer = dir.join(TOKENIZER_FILE_NAME);
    if !tokenizer.is_file() {
        return Err(MimirError::Configuration(format!(
            "No {} found in {}",
            TOKENIZER_FILE_NAME,
            dir.display()
        )));
    }

    let config = Some(dir.join(CONFIG_FILE_NAME)).filter(|path| path.is_file());

    Ok(ModelFiles {
        model,
        tokenizer,
        config,
    })
}

fn resolve_hub(repo_id: &str, cache_dir: &Path) -> Result<ModelFiles> {
    let api = hf_hub::api::sync::ApiBuilder::new()
        .with_cache_dir(cache_dir.to_path_buf())
        .build()
        .map_err(|e| {
            MimirError::Configuration(format!("Failed to initialize HF Hub API: {}", e))
        })?;

    let repo = api.model(repo_id.to_string());

    let model = ONNX_CANDIDATES
        .iter()
        .find_map(|name| repo.get(name).ok())
        .ok_or_else(|| {
            MimirError::Configuration(format!("Failed to find ONNX model in {}", repo_id))
        })?;

    let tokenizer = repo.get(TOKENIZER_FILE_NAME).map_err(|e| {
        MimirError::Configuration(format!(
            "Failed to download tokenizer from {}: {}",
            repo_id, e
        ))
    })?;

    let config = match repo.get(CONFIG_FILE_NAME) {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(repo_id, error = %e, "no model config in repo");
            None
        }
    };

    Ok(ModelFiles {
        model,
        tokenizer,
        config,
    })
}

/// Get the cache directory for models.
pub fn default_cache_dir() -> PathBuf {
    std::env::var("MIMIR_CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("mimir")
                .join("models")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_dir_with_all_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("onnx")).unwrap();
        std::fs::write(dir.path().join("onnx/model.onnx"), b"").unwrap();
        std::fs::write(dir.path().join("tokenizer.json"), b"{}").unwrap();
        std::fs::write(dir.path().join("config.json"), b"{}").unwrap();

        let files = ModelSource::local(dir.path()).resolve(dir.path()).unwrap();
        assert_eq!(files.model, dir.path().join("onnx/model.onnx"));
        assert_eq!(files.config, Some(dir.path().join("config.json")));
    }

    #[test]
    fn local_dir_without_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.onnx"), b"").unwrap();
        std::fs::write(dir.path().join("tokenizer.json"), b"{}").unwrap();

        let files = ModelSource::local(dir.path()).resolve(dir.path()).unwrap();
        assert_eq!(files.model, dir.path().join("model.onnx"));
        assert_eq!(files.config, None);
    }

    #[test]
    fn local_dir_without_tokenizer_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.onnx"), b"").unwrap();

        let err = ModelSource::local(dir.path()).resolve(dir.path()).unwrap_err();
        assert!(err.to_string().contains("tokenizer.json"));
    }

    #[test]
    fn missing_local_dir_fails() {
        let source = ModelSource::local("/nonexistent/model");
        assert!(source.resolve(Path::new("/tmp")).is_err());
        assert_eq!(source.name(), "model");
    }

    #[test]
    fn hub_source_name_is_repo_id() {
        let source = ModelSource::huggingface("cross-encoder/nli-deberta-v3-small");
        assert_eq!(source.name(), "cross-encoder/nli-deberta-v3-small");
    }
}
