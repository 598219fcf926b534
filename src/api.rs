use crate::collab::{CustomQaMatcher, CustomRuleMatcher, QaMatcher, ResponseCatalog, SimilarityScorer};
use crate::error::{Error, Result};
use crate::router::{Consulted, Route, SessionState};
use std::sync::Arc;
use std::time::Duration;

/// Confidence threshold used when none is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// Reply used when neither QA base answers and the gate recorded no domain.
pub const DEFAULT_FALLBACK_REPLY: &str = "Sorry, I don't know how to answer that yet.";

/// Options that affect routing.
#[derive(Debug, Clone)]
pub struct Options {
    /// Minimum rule-match score (inclusive) for a turn to be handed to a task handler.
    pub threshold: f64,
    /// Reply of last resort on the QA path.
    pub fallback_reply: String,
}

impl Default for Options {
    fn default() -> Self {
        Self { threshold: DEFAULT_THRESHOLD, fallback_reply: DEFAULT_FALLBACK_REPLY.to_string() }
    }
}

impl Options {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}

/// Shared, read-mostly collaborators.
///
/// These are loaded once and handed to every session by reference count; a turn never copies
/// or mutates them.
#[derive(Clone)]
pub struct Collaborators {
    pub scorer: Arc<dyn SimilarityScorer>,
    pub responses: Arc<dyn ResponseCatalog>,
    pub custom_rules: Arc<dyn CustomRuleMatcher>,
    pub custom_qa: Arc<dyn CustomQaMatcher>,
    pub general_qa: Arc<dyn QaMatcher>,
}

/// The outcome of one turn.
///
/// `response` is absent only when a confident match found no task handler. `target` and
/// `candidates` are present only alongside `status`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    pub response: Option<String>,
    /// Task status while a handler is mid-task.
    pub status: Option<String>,
    /// Slot the task wants confirmed next.
    pub target: Option<String>,
    /// Values offered for `target`.
    pub candidates: Option<Vec<String>>,
}

impl Envelope {
    /// No confident answer this turn.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn reply(response: impl Into<String>) -> Self {
        Envelope { response: Some(response.into()), ..Self::default() }
    }

    pub fn continuing(response: String, status: String, target: String, candidates: Vec<String>) -> Self {
        Envelope { response: Some(response), status: Some(status), target: Some(target), candidates: Some(candidates) }
    }

    /// True when a task handler expects the next turn to continue its task.
    pub fn is_mid_task(&self) -> bool {
        self.status.is_some()
    }
}

/// Per-stage timings for one turn.
#[derive(Debug, Clone, Default)]
pub struct TurnTimings {
    pub total: Duration,
    pub custom_rules: Duration,
    pub gate: Duration,
    pub dispatch: Duration,
    pub qa: Duration,
}

/// Additional details returned by [`Session::handle_turn_verbose`](crate::Session::handle_turn_verbose).
#[derive(Debug, Clone)]
pub struct TurnDetails {
    pub route: Route,
    /// Every collaborator that was called during the turn.
    pub consulted: Consulted,
    /// Root domain that had no registered handler, if that is why the turn went silent.
    pub missing_handler: Option<String>,
    /// Session state after the turn.
    pub state: SessionState,
    pub timings: TurnTimings,
}

#[derive(Debug, Clone)]
pub struct TurnReport {
    pub utterance: String,
    pub envelope: Envelope,
    pub details: TurnDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_use_point_four() {
        let opts = Options::default();
        assert_eq!(opts.threshold, 0.4);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = Options::default().with_threshold(1.5).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidThreshold(t) if t == 1.5));
    }

    #[test]
    fn silent_envelope_is_fully_absent() {
        let env = Envelope::silent();
        assert_eq!(env, Envelope { response: None, status: None, target: None, candidates: None });
        assert!(!env.is_mid_task());
    }
}
