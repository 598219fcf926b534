//! Per-caller custom rules.
//!
//! Each caller can own a small taxonomy of their own. Matching is one-shot: a confident hit
//! answers with the matched domain's configured response and never starts a task.

use crate::api::DEFAULT_THRESHOLD;
use crate::collab::{CustomRuleMatcher, ResponseCatalog, SimilarityScorer};
use crate::error::Result;
use crate::scorer::KeywordScorer;
use crate::taxonomy::Taxonomy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug)]
pub struct CustomRuleBase {
    threshold: f64,
    callers: HashMap<String, KeywordScorer>,
}

impl Default for CustomRuleBase {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl CustomRuleBase {
    pub fn new(threshold: f64) -> Self {
        CustomRuleBase { threshold, callers: HashMap::new() }
    }

    pub fn insert(&mut self, caller: impl Into<String>, taxonomy: Taxonomy) {
        self.callers.insert(caller.into(), KeywordScorer::new(Arc::new(taxonomy)));
    }

    pub fn load(&mut self, caller: impl Into<String>, path: impl AsRef<Path>) -> Result<()> {
        let taxonomy = Taxonomy::load(path)?;
        self.insert(caller, taxonomy);
        Ok(())
    }

    pub fn has_rules_for(&self, caller: &str) -> bool {
        self.callers.contains_key(caller)
    }
}

impl CustomRuleMatcher for CustomRuleBase {
    fn match_rule(&self, utterance: &str, caller: &str) -> Option<String> {
        let scorer = self.callers.get(caller)?;
        let matched = scorer.best_match(utterance);
        if matched.score < self.threshold {
            return None;
        }
        tracing::debug!(%caller, domain = %matched.domain, score = matched.score, "custom rule match");
        scorer.taxonomy().response_for(&matched.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> CustomRuleBase {
        let mut base = CustomRuleBase::default();
        let taxonomy = Taxonomy::from_json(
            r#"[
                { "domain": "opening hours", "concepts": ["opening hours", "open"], "response": "We open at 9." },
                { "domain": "menu", "concepts": ["menu"] }
            ]"#,
        )
        .unwrap();
        base.insert("shop-key", taxonomy);
        base
    }

    #[test]
    fn confident_match_answers_with_configured_response() {
        assert_eq!(base().match_rule("when are you open", "shop-key").as_deref(), Some("We open at 9."));
    }

    #[test]
    fn other_callers_see_nothing() {
        assert_eq!(base().match_rule("when are you open", "someone-else"), None);
    }

    #[test]
    fn domain_without_response_is_silent() {
        assert_eq!(base().match_rule("menu", "shop-key"), None);
    }

    #[test]
    fn rules_load_from_a_caller_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop-rules.json");
        std::fs::write(&path, r#"[{ "domain": "parking", "concepts": ["parking"], "response": "Free after 6." }]"#)
            .unwrap();

        let mut base = CustomRuleBase::default();
        base.load("shop-key", &path).unwrap();
        assert!(base.has_rules_for("shop-key"));
        assert_eq!(base.match_rule("parking", "shop-key").as_deref(), Some("Free after 6."));

        std::fs::write(&path, "not json").unwrap();
        let err = base.load("broken", &path).unwrap_err();
        assert!(matches!(err, crate::error::Error::Json { .. }), "{err}");
        assert!(!base.has_rules_for("broken"));
    }

    #[test]
    fn weak_match_is_silent() {
        let text = "tell me a long story about dragons castles knights and whether the shop is open";
        assert_eq!(base().match_rule(text, "shop-key"), None);
    }
}
