//! Approximate question answering.
//!
//! A QA base is a list of question/answer pairs. An utterance is answered by the question with
//! the highest normalized Levenshtein similarity, provided it clears `min_similarity`.

use crate::collab::{CustomQaMatcher, QaMatcher};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Similarity a question must reach before its answer is used.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone)]
pub struct QaBase {
    pairs: Vec<QaPair>,
    normalized: Vec<String>,
    min_similarity: f64,
}

impl Default for QaBase {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl QaBase {
    pub fn new(pairs: Vec<QaPair>) -> Self {
        let normalized = pairs.iter().map(|p| normalize(&p.question)).collect();
        QaBase { pairs, normalized, min_similarity: DEFAULT_MIN_SIMILARITY }
    }

    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let pairs: Vec<QaPair> = serde_json::from_str(&text).map_err(|e| Error::json(path, e))?;
        Ok(Self::new(pairs))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Closest question to `utterance` and its similarity, if any clears the bar.
    pub fn closest(&self, utterance: &str) -> Option<(&QaPair, f64)> {
        let needle = normalize(utterance);
        if needle.is_empty() {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        for (idx, question) in self.normalized.iter().enumerate() {
            let similarity = strsim::normalized_levenshtein(&needle, question);
            if best.is_none_or(|(_, top)| similarity > top) {
                best = Some((idx, similarity));
            }
        }

        best.filter(|&(_, similarity)| similarity >= self.min_similarity)
            .map(|(idx, similarity)| (&self.pairs[idx], similarity))
    }
}

impl QaMatcher for QaBase {
    fn query(&self, utterance: &str) -> Option<String> {
        let (pair, similarity) = self.closest(utterance)?;
        tracing::debug!(question = %pair.question, similarity, "qa match");
        Some(pair.answer.clone())
    }
}

/// QA bases keyed by caller.
#[derive(Debug, Clone, Default)]
pub struct CustomQaBase {
    callers: HashMap<String, QaBase>,
}

impl CustomQaBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, caller: impl Into<String>, base: QaBase) {
        self.callers.insert(caller.into(), base);
    }

    pub fn load(&mut self, caller: impl Into<String>, path: impl AsRef<Path>) -> Result<()> {
        let base = QaBase::load(path)?;
        self.insert(caller, base);
        Ok(())
    }

    pub fn has_answers_for(&self, caller: &str) -> bool {
        self.callers.contains_key(caller)
    }
}

impl CustomQaMatcher for CustomQaBase {
    fn query(&self, utterance: &str, caller: &str) -> Option<String> {
        QaMatcher::query(self.callers.get(caller)?, utterance)
    }
}

fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let stripped: String = lowered.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(question: &str, answer: &str) -> QaPair {
        QaPair { question: question.to_string(), answer: answer.to_string() }
    }

    fn base() -> QaBase {
        QaBase::new(vec![
            pair("What time do you open?", "Nine o'clock."),
            pair("Where are you located?", "Main street."),
        ])
    }

    #[test]
    fn near_miss_question_is_answered() {
        assert_eq!(base().query("what time do you open").as_deref(), Some("Nine o'clock."));
        assert_eq!(base().query("where r you located").as_deref(), Some("Main street."));
    }

    #[test]
    fn distant_question_is_silent() {
        assert_eq!(base().query("hello"), None);
        assert_eq!(base().query(""), None);
    }

    #[test]
    fn min_similarity_is_inclusive_and_configurable() {
        let strict = base().with_min_similarity(1.0);
        assert_eq!(strict.query("What time do you open").as_deref(), Some("Nine o'clock."));
        assert_eq!(strict.query("what time do u open"), None);
    }

    #[test]
    fn custom_base_is_scoped_by_caller() {
        let mut custom = CustomQaBase::new();
        custom.insert("key-1", base());
        assert_eq!(custom.query("where are you located", "key-1").as_deref(), Some("Main street."));
        assert_eq!(custom.query("where are you located", "key-2"), None);
    }

    #[test]
    fn custom_base_loads_a_caller_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop-qa.json");
        std::fs::write(&path, r#"[{ "question": "Do you deliver?", "answer": "Within the city." }]"#).unwrap();

        let mut custom = CustomQaBase::new();
        custom.load("shop-key", &path).unwrap();
        assert!(custom.has_answers_for("shop-key"));
        assert_eq!(custom.query("do you deliver", "shop-key").as_deref(), Some("Within the city."));

        let missing = custom.load("other", dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, Error::Io { .. }), "{missing}");
        assert!(!custom.has_answers_for("other"));
    }

    #[test]
    fn empty_base_never_answers() {
        assert!(QaBase::default().is_empty());
        assert_eq!(QaBase::default().query("anything"), None);
    }
}
