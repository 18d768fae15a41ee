//! Encoding premise/hypothesis pairs into model inputs.
//!
//! Models differ in what they accept: BERT-style encoders want
//! `token_type_ids`, RoBERTa/BART-style ones reject them, and some exported
//! graphs take `int32` ids instead of `int64`. [`EncodingOptions`] carries
//! both switches; the encoder builds an [`EncodedInput`] to match.

#[cfg(feature = "local-inference")]
mod hf;

#[cfg(feature = "local-inference")]
pub use hf::HfPairEncoder;

use crate::config::ResolvedConfig;
use crate::error::Result;

/// How to shape encoded inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodingOptions {
    /// Include `token_type_ids`.
    pub use_token_type: bool,
    /// Emit `int32` tensors instead of `int64`.
    pub int32: bool,
}

impl EncodingOptions {
    pub fn new(use_token_type: bool, int32: bool) -> Self {
        Self {
            use_token_type,
            int32,
        }
    }

    /// Token-type usage from a resolved model config.
    pub fn from_resolved(resolved: &ResolvedConfig, int32: bool) -> Self {
        Self::new(resolved.use_token_type, int32)
    }
}

/// Token ids for one premise/hypothesis pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPair<T> {
    pub input_ids: Vec<T>,
    pub attention_mask: Vec<T>,
    /// Present only when token types were requested.
    pub token_type_ids: Option<Vec<T>>,
}

impl<T> EncodedPair<T> {
    /// Sequence length.
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// An encoded pair in the integer width the model expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedInput {
    I64(EncodedPair<i64>),
    I32(EncodedPair<i32>),
}

impl EncodedInput {
    /// Build model inputs from raw tokenizer output.
    pub fn from_ids(
        ids: &[u32],
        attention_mask: &[u32],
        type_ids: &[u32],
        options: EncodingOptions,
    ) -> Self {
        if options.int32 {
            let convert = |values: &[u32]| values.iter().map(|&v| v as i32).collect::<Vec<_>>();
            Self::I32(EncodedPair {
                input_ids: convert(ids),
                attention_mask: convert(attention_mask),
                token_type_ids: options.use_token_type.then(|| convert(type_ids)),
            })
        } else {
            let convert = |values: &[u32]| values.iter().map(|&v| i64::from(v)).collect::<Vec<_>>();
            Self::I64(EncodedPair {
                input_ids: convert(ids),
                attention_mask: convert(attention_mask),
                token_type_ids: options.use_token_type.then(|| convert(type_ids)),
            })
        }
    }

    /// Sequence length.
    pub fn len(&self) -> usize {
        match self {
            Self::I64(pair) => pair.len(),
            Self::I32(pair) => pair.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_token_types(&self) -> bool {
        match self {
            Self::I64(pair) => pair.token_type_ids.is_some(),
            Self::I32(pair) => pair.token_type_ids.is_some(),
        }
    }
}

/// Turns a premise/hypothesis pair into model inputs.
pub trait PairEncoder: Send + Sync {
    fn encode_pair(
        &self,
        premise: &str,
        hypothesis: &str,
        options: EncodingOptions,
    ) -> Result<EncodedInput>;
}
