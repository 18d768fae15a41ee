//! Mimir error types

use std::time::Duration;

/// Mimir error types
#[derive(Debug, thiserror::Error)]
pub enum MimirError {
    // Model configuration errors
    /// `config.json` is missing or malformed.
    ///
    /// Recoverable: the graceful resolver logs it and keeps its defaults.
    #[error("failed to parse model config: {0}")]
    ConfigParse(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    // Request errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A resolved class index does not exist in the model's output row.
    #[error("{role} index {index} is out of range for a {width}-class output")]
    IndexOutOfRange {
        role: &'static str,
        index: usize,
        width: usize,
    },

    #[error("logit shape mismatch: {0}")]
    ShapeMismatch(String),

    // Inference errors
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("inference timed out after {0:?}")]
    Timeout(Duration),

    // Data processing errors
    #[error("data error: {0}")]
    DataError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MimirError {
    /// Whether processing can continue past this error using defaults.
    ///
    /// Only config parse failures qualify; every other variant aborts the
    /// classification call it was raised in.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MimirError::ConfigParse(_))
    }
}

/// Result type alias for Mimir operations
pub type Result<T> = std::result::Result<T, MimirError>;
