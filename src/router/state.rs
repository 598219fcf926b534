//! Session state.
//!
//! `SessionState` is replaced wholesale on every rule match rather than patched field by
//! field: the only way to produce a state that carries a match is [`SessionState::from_match`],
//! which is also the only caller of [`derive_root_domain`]. That keeps `root_domain` consistent
//! with `matched_path`/`speech_domain` in every reachable state.

use crate::collab::{DomainPath, RuleMatch};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub last_utterance: String,
    pub speech_domain: String,
    pub matched_keyword: String,
    pub matched_path: DomainPath,
    pub similarity_score: f64,
    root_domain: String,
}

impl SessionState {
    /// State after matching `utterance` against the rule taxonomy.
    pub fn from_match(utterance: &str, matched: RuleMatch) -> Self {
        let root_domain = derive_root_domain(&matched.path, &matched.domain);
        SessionState {
            last_utterance: utterance.to_string(),
            speech_domain: matched.domain,
            matched_keyword: matched.keyword,
            matched_path: matched.path,
            similarity_score: clamp_score(matched.score),
            root_domain,
        }
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    /// True until the first rule match of the session.
    pub fn is_fresh(&self) -> bool {
        self.last_utterance.is_empty() && self.speech_domain.is_empty()
    }
}

/// Root of a match: the first path segment, or the matched domain for root-level hits.
pub fn derive_root_domain(path: &DomainPath, speech_domain: &str) -> String {
    match path.first_segment() {
        Some(root) => root.to_string(),
        None => speech_domain.to_string(),
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) }
}
