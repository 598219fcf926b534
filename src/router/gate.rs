//! Confidence gate.

use super::state::SessionState;
use crate::collab::SimilarityScorer;

/// Outcome of the confidence gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Confident,
    Unconfident,
}

impl Confidence {
    pub fn is_confident(self) -> bool {
        matches!(self, Confidence::Confident)
    }
}

/// Score `utterance` and return the state it produces together with the gate decision.
///
/// The returned state must be stored whatever the decision: the QA path still reads the
/// matched domain when composing its fallback reply.
pub fn evaluate_confidence(
    scorer: &dyn SimilarityScorer,
    utterance: &str,
    threshold: f64,
) -> (SessionState, Confidence) {
    let state = SessionState::from_match(utterance, scorer.best_match(utterance));
    let confidence = if state.similarity_score >= threshold { Confidence::Confident } else { Confidence::Unconfident };

    tracing::debug!(
        score = state.similarity_score,
        domain = %state.speech_domain,
        root = %state.root_domain(),
        path = %state.matched_path,
        ?confidence,
        "rule match"
    );

    (state, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{DomainPath, RuleMatch};

    struct Fixed(f64);

    impl SimilarityScorer for Fixed {
        fn best_match(&self, _utterance: &str) -> RuleMatch {
            RuleMatch {
                score: self.0,
                domain: "flight".into(),
                keyword: "flight".into(),
                path: DomainPath::new("travel>flight"),
            }
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let (_, confidence) = evaluate_confidence(&Fixed(0.4), "x", 0.4);
        assert_eq!(confidence, Confidence::Confident);

        let (_, confidence) = evaluate_confidence(&Fixed(0.399999), "x", 0.4);
        assert_eq!(confidence, Confidence::Unconfident);
    }

    #[test]
    fn unconfident_match_still_produces_state() {
        let (state, confidence) = evaluate_confidence(&Fixed(0.1), "hello", 0.4);
        assert!(!confidence.is_confident());
        assert_eq!(state.last_utterance, "hello");
        assert_eq!(state.speech_domain, "flight");
        assert_eq!(state.root_domain(), "travel");
    }
}
