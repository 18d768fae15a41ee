//! Ordered rule tables applied to a [`ModelConfig`].

use tracing::{debug, warn};

use super::{ModelConfig, ResolvedConfig};

/// The two NLI classes zero-shot scoring reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassRole {
    Entailment,
    Contradiction,
}

impl ClassRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entailment => "entailment",
            Self::Contradiction => "contradiction",
        }
    }
}

/// Lowercased `label2id` key prefix → class it identifies.
const LABEL_PREFIX_RULES: &[(&str, ClassRole)] = &[
    ("entail", ClassRole::Entailment),
    ("contra", ClassRole::Contradiction),
];

type TokenTypeRule = (&'static str, fn(&ModelConfig) -> bool);

/// Evaluated in order; the first rule that fires enables token types.
const TOKEN_TYPE_RULES: &[TokenTypeRule] = &[
    ("type_vocab_size", has_segment_vocab),
    ("model_type", is_segment_architecture),
];

/// Architectures trained with segment embeddings.
const SEGMENT_MODEL_TYPES: &[&str] = &["bert", "albert", "xlnet"];
const SEGMENT_MODEL_TYPE_PREFIXES: &[&str] = &["deberta"];

fn has_segment_vocab(config: &ModelConfig) -> bool {
    config.type_vocab_size().is_some_and(|size| size > 1)
}

fn is_segment_architecture(config: &ModelConfig) -> bool {
    config.model_type().is_some_and(|model_type| {
        let model_type = model_type.to_lowercase();
        SEGMENT_MODEL_TYPES.contains(&model_type.as_str())
            || SEGMENT_MODEL_TYPE_PREFIXES
                .iter()
                .any(|prefix| model_type.starts_with(prefix))
    })
}

/// Map a `label2id` key to the class it names, if any.
pub(crate) fn match_label(label: &str) -> Option<ClassRole> {
    let label = label.to_lowercase();
    LABEL_PREFIX_RULES
        .iter()
        .find(|(prefix, _)| label.starts_with(prefix))
        .map(|(_, role)| *role)
}

/// Resolve class indices and token-type usage from a parsed config.
///
/// `label2id` entries are applied in document order; when several keys
/// name the same class, the last one wins and a warning is logged. Indices
/// the config does not mention keep their value from `defaults`. The
/// token-type decision is always inferred from the document: it is `false`
/// unless one of the token-type rules fires.
pub fn resolve(config: &ModelConfig, defaults: ResolvedConfig) -> ResolvedConfig {
    let mut indices = defaults.indices;
    let mut seen: Vec<ClassRole> = Vec::with_capacity(LABEL_PREFIX_RULES.len());

    for (label, id) in config.label_ids() {
        let Some(role) = match_label(label) else {
            continue;
        };
        if seen.contains(&role) {
            warn!(
                label,
                role = role.as_str(),
                previous = indices.get(role),
                id,
                "multiple label2id entries match, keeping the last"
            );
        } else {
            seen.push(role);
        }
        indices.set(role, id);
    }

    let fired = TOKEN_TYPE_RULES
        .iter()
        .find(|(_, applies)| applies(config))
        .map(|(field, _)| *field);
    if let Some(field) = fired {
        debug!(field, "token type ids enabled");
    }

    ResolvedConfig {
        indices,
        use_token_type: fired.is_some(),
    }
}
