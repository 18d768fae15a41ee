//! Classification request type

use serde::{Deserialize, Serialize};

use crate::hypothesis::DEFAULT_TEMPLATE;

/// A zero-shot classification request.
///
/// Candidate order matters: it decides which of two equally scored labels
/// ranks first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub text: String,
    pub candidates: Vec<String>,
    #[serde(default = "default_template")]
    pub hypothesis_template: String,
    #[serde(default)]
    pub multi_label: bool,
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

impl ClassificationRequest {
    /// Single-label request with the default hypothesis template.
    pub fn new<S: Into<String>>(
        text: impl Into<String>,
        candidates: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            text: text.into(),
            candidates: candidates.into_iter().map(Into::into).collect(),
            hypothesis_template: default_template(),
            multi_label: false,
        }
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.hypothesis_template = template.into();
        self
    }

    pub fn multi_label(mut self, multi_label: bool) -> Self {
        self.multi_label = multi_label;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let request = ClassificationRequest::new("text", ["a", "b"]);
        assert_eq!(request.candidates, vec!["a", "b"]);
        assert_eq!(request.hypothesis_template, "This example is {}.");
        assert!(!request.multi_label);
    }

    #[test]
    fn deserialize_fills_defaults() {
        let request: ClassificationRequest =
            serde_json::from_str(r#"{"text": "t", "candidates": ["x"]}"#).unwrap();
        assert_eq!(request, ClassificationRequest::new("t", ["x"]));
    }

    #[test]
    fn setters_chain() {
        let request = ClassificationRequest::new("t", vec!["x".to_string()])
            .template("About {}")
            .multi_label(true);
        assert_eq!(request.hypothesis_template, "About {}");
        assert!(request.multi_label);
    }
}
