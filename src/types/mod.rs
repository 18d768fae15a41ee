//! Public types for the Mimir API.

mod request;
mod result;

pub use request::ClassificationRequest;
pub use result::ClassificationResult;
