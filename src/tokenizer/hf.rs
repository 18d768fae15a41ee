//! HuggingFace tokenizers implementation.

use super::{EncodedInput, EncodingOptions, PairEncoder};
use crate::error::{MimirError, Result};
use std::path::Path;

/// Pair encoder backed by a `tokenizer.json`.
pub struct HfPairEncoder {
    inner: tokenizers::Tokenizer,
}

impl HfPairEncoder {
    /// Load tokenizer from local file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            MimirError::Configuration(format!("Failed to load tokenizer from {:?}: {}", path, e))
        })?;

        Ok(Self { inner })
    }
}

impl PairEncoder for HfPairEncoder {
    fn encode_pair(
        &self,
        premise: &str,
        hypothesis: &str,
        options: EncodingOptions,
    ) -> Result<EncodedInput> {
        let encoding = self
            .inner
            .encode((premise, hypothesis), true)
            .map_err(|e| MimirError::DataError(format!("Tokenization failed: {}", e)))?;

        Ok(EncodedInput::from_ids(
            encoding.get_ids(),
            encoding.get_attention_mask(),
            encoding.get_type_ids(),
            options,
        ))
    }
}
