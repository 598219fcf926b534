//! Turn routing.
//!
//! This module is the core of the crate: the state machine that decides which response
//! strategy answers an utterance and carries multi-turn task state between calls.
//!
//! ## How a turn flows
//!
//! ```text
//! utterance ─┬─ caller? ── CustomRuleMatcher ──── Some ──> (response, -, -, -)
//!            │                    │ None
//!            v                    v
//!      evaluate_confidence (gate.rs)
//!        - SimilarityScorer::best_match
//!        - SessionState::from_match        (state.rs, derives root domain)
//!        - score >= threshold ?
//!            │ confident                          │ unconfident
//!            v                                    v
//!      dispatch_to_root_domain (dispatch.rs)   CustomQaMatcher (caller only)
//!        - HandlerRegistry::lookup (registry.rs)  then QaMatcher
//!        - TaskHandler::respond                   then fallback text
//!        - status? next_query + trace             │
//!            │                                    v
//!            v                              (answer, -, -, -)
//!      (response, status, target, candidates)
//! ```
//!
//! Each branch short-circuits: the first one that produces a response wins.
//!
//! ## Responsibilities by module
//!
//! - `state.rs`: `SessionState` and root-domain derivation.
//! - `gate.rs`: the confidence gate, a pure `(scorer, utterance, threshold) -> (state, decision)`.
//! - `registry.rs`: root domain -> task handler; owns handler instances for the session.
//! - `dispatch.rs`: task handler handoff, missing-handler recovery, default domain replies.
//! - `metrics.rs`: route, consulted collaborators and timings for verbose turns.
//! - `session.rs`: `Session`, which strings the above together.
//!
//! ## Debugging
//!
//! Routing decisions are emitted as `tracing` events at `debug`; a missing task handler is a
//! `warn`.

#[path = "router/dispatch.rs"]
mod dispatch;
#[path = "router/gate.rs"]
mod gate;
#[path = "router/metrics.rs"]
mod metrics;
#[path = "router/registry.rs"]
mod registry;
#[path = "router/session.rs"]
mod session;
#[path = "router/state.rs"]
mod state;


pub use dispatch::default_response_for;
pub use gate::{Confidence, evaluate_confidence};
pub use metrics::{Consulted, Route};
pub use registry::HandlerRegistry;
pub use session::Session;
pub use state::{SessionState, derive_root_domain};
