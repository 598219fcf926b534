//! Conversational turn routing.
//!
//! A [`Session`] takes one line of user text at a time and decides which strategy answers it:
//!
//! 1. the caller's own custom rules, when a caller identity is given;
//! 2. the global rule taxonomy, gated by a confidence threshold, handing confident matches to
//!    the [`TaskHandler`] registered for the matched root domain (possibly over many turns);
//! 3. the caller's custom QA base, then the general QA base;
//! 4. a canned fallback.
//!
//! The router only talks to its collaborators through the traits in [`collab`]. The crate also
//! ships simple reference implementations ([`KeywordScorer`], [`Taxonomy`], [`QaBase`],
//! [`CustomRuleBase`]) so a session can run end to end.
//!
//! # Example
//! ```
//! use chatdispatch::{
//!     Collaborators, CustomQaBase, CustomRuleBase, HandlerRegistry, KeywordScorer, Options, QaBase, Session, Taxonomy,
//! };
//! use std::sync::Arc;
//!
//! let rules = r#"[{ "domain": "weather", "concepts": ["weather"], "response": "Sunny." }]"#;
//! let taxonomy = Arc::new(Taxonomy::from_json(rules).unwrap());
//! let collaborators = Collaborators {
//!     scorer: Arc::new(KeywordScorer::new(taxonomy.clone())),
//!     responses: taxonomy,
//!     custom_rules: Arc::new(CustomRuleBase::default()),
//!     custom_qa: Arc::new(CustomQaBase::new()),
//!     general_qa: Arc::new(QaBase::default()),
//! };
//! let mut session = Session::new(collaborators, HandlerRegistry::new(), Options::default()).unwrap();
//!
//! // Confident, but no task handler for "weather": no answer this turn.
//! assert_eq!(session.handle_turn("weather", None, None).response, None);
//! // Unconfident: QA is silent, so the matched domain's reply is the fallback.
//! let env = session.handle_turn("is the weather going to be nice later on today", None, None);
//! assert_eq!(env.response.as_deref(), Some("Sunny."));
//! ```

#[macro_use]
mod macros;
mod api;
pub mod collab;
mod custom_rules;
mod error;
mod qa;
mod router;
mod scorer;
pub mod sink;
mod taxonomy;

pub use api::{
    Collaborators, DEFAULT_FALLBACK_REPLY, DEFAULT_THRESHOLD, Envelope, Options, TurnDetails, TurnReport, TurnTimings,
};
pub use collab::{
    CustomQaMatcher, CustomRuleMatcher, DomainPath, NextQuery, QaMatcher, ResponseCatalog, RuleMatch, SimilarityScorer,
    TaskHandler, TaskReply,
};
pub use custom_rules::CustomRuleBase;
pub use error::{Error, Result};
pub use qa::{CustomQaBase, DEFAULT_MIN_SIMILARITY, QaBase, QaPair};
pub use router::{
    Confidence, Consulted, HandlerRegistry, Route, Session, SessionState, default_response_for, derive_root_domain,
    evaluate_confidence,
};
pub use scorer::{KeywordScorer, tokenize};
pub use taxonomy::{Domain, DomainSpec, Taxonomy};
