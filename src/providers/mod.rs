//! NLI inference backends.
//!
//! [`NliBackend`] is the seam the classifier runs on. [`TimeoutBackend`]
//! decorates any backend; [`OnnxNliBackend`] runs a local ONNX export when
//! the `local-inference` feature is enabled.

#[cfg(feature = "local-inference")]
pub mod onnx_nli;
pub mod timeout;
pub mod traits;

#[cfg(feature = "local-inference")]
pub use onnx_nli::OnnxNliBackend;
pub use timeout::TimeoutBackend;
pub use traits::{NliBackend, run_blocking};
