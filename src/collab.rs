//! Collaborator contracts.
//!
//! The router never knows how a rule is scored, how a QA base is searched, or what a task
//! handler does with a slot. It talks to those pieces only through the traits in this module.
//!
//! Shared collaborators (`SimilarityScorer`, the matchers, `ResponseCatalog`) take `&self` and
//! are `Send + Sync` so one loaded instance can serve many sessions. Task handlers take
//! `&mut self` because they may carry slot-filling progress between turns.

use std::io::{self, Write};

/// Separator between segments of a taxonomy path, e.g. `travel>flight`.
pub const PATH_DELIMITER: char = '>';

/// A `>`-delimited path through the domain taxonomy.
///
/// An empty path means the match was a root-level hit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainPath(String);

impl DomainPath {
    pub fn new(raw: impl Into<String>) -> Self {
        DomainPath(raw.into())
    }

    /// Build a path from already-split segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments.into_iter().map(|s| s.as_ref().to_string()).collect::<Vec<_>>();
        DomainPath(segments.join(PATH_DELIMITER.to_string().as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// First segment, or `None` for an empty path.
    pub fn first_segment(&self) -> Option<&str> {
        if self.is_empty() {
            return None;
        }
        self.0.split(PATH_DELIMITER).next().map(str::trim)
    }

    pub fn segments(&self) -> Vec<&str> {
        if self.is_empty() {
            return Vec::new();
        }
        self.0.split(PATH_DELIMITER).map(str::trim).collect()
    }
}

impl std::fmt::Display for DomainPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Best rule match for one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    pub score: f64,
    pub domain: String,
    pub keyword: String,
    pub path: DomainPath,
}

impl RuleMatch {
    /// The structured "nothing matched" result.
    pub fn none() -> Self {
        RuleMatch { score: 0.0, domain: String::new(), keyword: String::new(), path: DomainPath::default() }
    }
}

/// Maps an utterance to the best-matching domain of the rule taxonomy.
///
/// Implementations must pick a single best match deterministically; the router does not
/// resolve ties.
pub trait SimilarityScorer: Send + Sync {
    fn best_match(&self, utterance: &str) -> RuleMatch;

    /// Split an utterance the way the scorer sees it. Used for conversation logging.
    fn tokenize(&self, utterance: &str) -> Vec<String> {
        utterance.split_whitespace().map(str::to_string).collect()
    }
}

/// One-shot matcher over rules owned by a single caller.
pub trait CustomRuleMatcher: Send + Sync {
    fn match_rule(&self, utterance: &str, caller: &str) -> Option<String>;
}

/// Un-scoped question-answering lookup.
pub trait QaMatcher: Send + Sync {
    fn query(&self, utterance: &str) -> Option<String>;
}

/// Question-answering lookup over a caller's own knowledge base.
pub trait CustomQaMatcher: Send + Sync {
    fn query(&self, utterance: &str, caller: &str) -> Option<String>;
}

/// Canned replies configured per domain.
pub trait ResponseCatalog: Send + Sync {
    fn response_for(&self, domain: &str) -> Option<String>;
}

/// What a task handler returned for one utterance.
///
/// `status` is `Some` while the task is mid-flight and needs more input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskReply {
    pub status: Option<String>,
    pub response: Option<String>,
}

impl TaskReply {
    /// A single-pass answer outside of any task.
    pub fn answer(response: impl Into<String>) -> Self {
        TaskReply { status: None, response: Some(response.into()) }
    }

    /// The task needs another turn.
    pub fn pending(status: impl Into<String>, response: Option<String>) -> Self {
        TaskReply { status: Some(status.into()), response }
    }
}

/// The next slot a task wants confirmed and the values offered for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextQuery {
    pub target: String,
    pub candidates: Vec<String>,
}

/// A domain-specific, possibly multi-turn task.
pub trait TaskHandler: Send {
    /// Answer `utterance`, matched against `domain`. `target` is set when the caller is
    /// replying to a previously posed slot question.
    fn respond(&mut self, utterance: &str, domain: &str, target: Option<&str>) -> TaskReply;

    fn next_query(&self) -> NextQuery;

    /// Write the handler's current extraction state to the diagnostic sink.
    fn trace(&self, sink: &mut dyn Write) -> io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_has_no_segments() {
        let path = DomainPath::default();
        assert!(path.is_empty());
        assert_eq!(path.first_segment(), None);
        assert!(path.segments().is_empty());
    }

    #[test]
    fn segments_are_trimmed() {
        let path = DomainPath::new("root > sub > leaf");
        assert_eq!(path.first_segment(), Some("root"));
        assert_eq!(path.segments(), vec!["root", "sub", "leaf"]);
    }

    #[test]
    fn from_segments_joins_with_delimiter() {
        let path = DomainPath::from_segments(["travel", "flight"]);
        assert_eq!(path.as_str(), "travel>flight");
    }
}
