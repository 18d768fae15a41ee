//! Hypothesis construction from a template.

/// Marker substituted with the candidate label.
pub const PLACEHOLDER: &str = "{}";

/// Template used when a request does not supply one.
pub const DEFAULT_TEMPLATE: &str = "This example is {}.";

/// Turn a candidate label into an NLI hypothesis.
///
/// Only the first `{}` is replaced; later ones are left as literal text.
/// A template with no placeholder gets the candidate appended with no
/// separator.
///
/// ```
/// use mimir::hypothesis::build_hypothesis;
///
/// assert_eq!(build_hypothesis("This text is about {}.", "sports"), "This text is about sports.");
/// assert_eq!(build_hypothesis("Topic: ", "sports"), "Topic: sports");
/// ```
pub fn build_hypothesis(template: &str, candidate: &str) -> String {
    match template.split_once(PLACEHOLDER) {
        Some((before, after)) => {
            let mut hypothesis = String::with_capacity(template.len() + candidate.len());
            hypothesis.push_str(before);
            hypothesis.push_str(candidate);
            hypothesis.push_str(after);
            hypothesis
        }
        None => format!("{template}{candidate}"),
    }
}
