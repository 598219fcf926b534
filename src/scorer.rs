//! Keyword cosine scorer.
//!
//! A dependency-free stand-in for an embedding model: every concept phrase of every domain is
//! turned into a bag of tokens once, and an utterance is scored by the cosine similarity of its
//! own bag against each concept. The best concept decides the domain.
//!
//! Tokens are lowercased word runs; CJK ideographs are split one per token because those
//! scripts are written without spaces.

use crate::collab::{RuleMatch, SimilarityScorer};
use crate::taxonomy::Taxonomy;
use std::collections::HashMap;
use std::sync::Arc;

type Bag = HashMap<String, f64>;

#[derive(Debug)]
struct Concept {
    domain: usize,
    phrase: String,
    bag: Bag,
    norm: f64,
}

#[derive(Debug)]
pub struct KeywordScorer {
    taxonomy: Arc<Taxonomy>,
    concepts: Vec<Concept>,
}

impl KeywordScorer {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        let mut concepts = Vec::new();
        for (idx, domain) in taxonomy.domains().enumerate() {
            for phrase in &domain.concepts {
                let bag = bag_of(&tokenize(phrase));
                let norm = norm(&bag);
                if norm > 0.0 {
                    concepts.push(Concept { domain: idx, phrase: phrase.clone(), bag, norm });
                }
            }
        }
        KeywordScorer { taxonomy, concepts }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }
}

impl SimilarityScorer for KeywordScorer {
    fn best_match(&self, utterance: &str) -> RuleMatch {
        let bag = bag_of(&tokenize(utterance));
        let utterance_norm = norm(&bag);
        if utterance_norm == 0.0 {
            return RuleMatch::none();
        }

        let mut best: Option<(f64, &Concept)> = None;
        for concept in &self.concepts {
            let dot: f64 = concept.bag.iter().map(|(token, w)| w * bag.get(token).copied().unwrap_or(0.0)).sum();
            let score = dot / (utterance_norm * concept.norm);
            // Strict comparison: earlier concepts win ties.
            if best.is_none_or(|(top, _)| score > top) {
                best = Some((score, concept));
            }
        }

        match best {
            Some((score, concept)) if score > 0.0 => {
                let Some(domain) = self.taxonomy.domains().nth(concept.domain) else {
                    return RuleMatch::none();
                };
                RuleMatch {
                    score: score.min(1.0),
                    domain: domain.name.clone(),
                    keyword: concept.phrase.clone(),
                    path: domain.path.clone(),
                }
            }
            _ => RuleMatch::none(),
        }
    }

    fn tokenize(&self, utterance: &str) -> Vec<String> {
        tokenize(utterance)
    }
}

/// Lowercased word tokens; CJK ideographs one per token.
pub fn tokenize(text: &str) -> Vec<String> {
    let re = crate::regex!(r"\p{Han}|[\p{L}\p{N}_']+");
    re.find_iter(text).map(|m| m.as_str().to_lowercase()).collect()
}

fn bag_of(tokens: &[String]) -> Bag {
    let mut bag = Bag::new();
    for token in tokens {
        *bag.entry(token.clone()).or_insert(0.0) += 1.0;
    }
    bag
}

fn norm(bag: &Bag) -> f64 {
    bag.values().map(|w| w * w).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> KeywordScorer {
        let taxonomy = Taxonomy::from_json(
            r#"[
                { "domain": "travel", "concepts": ["trip"], "children": ["flight"] },
                { "domain": "flight", "concepts": ["flight", "plane ticket"] },
                { "domain": "weather", "concepts": ["weather", "天氣"] }
            ]"#,
        )
        .unwrap();
        KeywordScorer::new(Arc::new(taxonomy))
    }

    #[test]
    fn tokenizer_splits_words_and_ideographs() {
        assert_eq!(tokenize("Book a Flight!"), vec!["book", "a", "flight"]);
        assert_eq!(tokenize("今天天氣"), vec!["今", "天", "天", "氣"]);
    }

    #[test]
    fn best_match_carries_path_and_keyword() {
        let m = scorer().best_match("book a flight");
        assert_eq!(m.domain, "flight");
        assert_eq!(m.keyword, "flight");
        assert_eq!(m.path.as_str(), "travel>flight");
        assert!(m.score > 0.5 && m.score <= 1.0, "{}", m.score);
    }

    #[test]
    fn exact_concept_scores_one() {
        let m = scorer().best_match("Weather");
        assert_eq!(m.domain, "weather");
        assert!((m.score - 1.0).abs() < 1e-9);
        assert!(m.path.is_empty());
    }

    #[test]
    fn ideographs_match_cjk_concepts() {
        let m = scorer().best_match("天氣");
        assert_eq!(m.domain, "weather");
        assert_eq!(m.keyword, "天氣");
    }

    #[test]
    fn unrelated_utterance_is_no_match() {
        assert_eq!(scorer().best_match("hello"), RuleMatch::none());
        assert_eq!(scorer().best_match("   "), RuleMatch::none());
    }
}
