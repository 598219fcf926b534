use super::dispatch::{DispatchContext, default_response_for, dispatch_to_root_domain};
use super::gate::{Confidence, evaluate_confidence};
use super::metrics::{Consulted, Route, TurnMetrics};
use super::registry::HandlerRegistry;
use super::state::SessionState;
use crate::api::{Collaborators, Envelope, Options, TurnDetails, TurnReport};
use crate::error::Result;
use std::io::{self, Write};
use std::time::Instant;

/// One running conversation.
///
/// A session owns its state, its task handlers and its diagnostic sink. Turns are processed
/// one at a time through `&mut self`; shared collaborators are only read.
pub struct Session {
    collaborators: Collaborators,
    options: Options,
    registry: HandlerRegistry,
    sink: Box<dyn Write + Send>,
    state: SessionState,
}

impl Session {
    pub fn new(collaborators: Collaborators, registry: HandlerRegistry, options: Options) -> Result<Self> {
        options.validate()?;
        Ok(Session { collaborators, options, registry, sink: Box::new(io::sink()), state: SessionState::default() })
    }

    /// Replace the diagnostic sink task handlers trace into.
    pub fn with_sink(mut self, sink: impl Write + Send + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    /// Route one utterance.
    ///
    /// `target` names the slot being confirmed when the turn answers a question a task posed
    /// on the previous turn; `caller` scopes custom rules and custom QA.
    pub fn handle_turn(&mut self, utterance: &str, target: Option<&str>, caller: Option<&str>) -> Envelope {
        let mut metrics = TurnMetrics::default();
        let (envelope, _) = self.run_turn(utterance, target, caller, &mut metrics);
        envelope
    }

    /// Like [`handle_turn`](Self::handle_turn), also reporting the route taken and timings.
    pub fn handle_turn_verbose(&mut self, utterance: &str, target: Option<&str>, caller: Option<&str>) -> TurnReport {
        let mut metrics = TurnMetrics::default();
        let (envelope, route) = self.run_turn(utterance, target, caller, &mut metrics);

        TurnReport {
            utterance: utterance.to_string(),
            envelope,
            details: TurnDetails {
                route,
                consulted: metrics.consulted,
                missing_handler: metrics.missing_handler,
                state: self.state.clone(),
                timings: metrics.timings,
            },
        }
    }

    /// Run the confidence gate and store the state it produces.
    pub fn evaluate_confidence(&mut self, utterance: &str) -> Confidence {
        let scorer = self.collaborators.scorer.as_ref();
        let (state, confidence) = evaluate_confidence(scorer, utterance, self.options.threshold);
        self.state = state;
        confidence
    }

    /// Hand the current match to its root domain's task handler.
    pub fn dispatch_to_root_domain(&mut self, target: Option<&str>) -> Envelope {
        let mut metrics = TurnMetrics::default();
        self.dispatch(target, &mut metrics).0
    }

    pub fn default_response_for(&self, domain: &str) -> String {
        default_response_for(self.collaborators.responses.as_ref(), domain)
    }

    /// `(root domain, matched domain, tokens of the last utterance)` for conversation logs.
    pub fn logger_data(&self) -> (String, String, Vec<String>) {
        (
            self.state.root_domain().to_string(),
            self.state.speech_domain.clone(),
            self.collaborators.scorer.tokenize(&self.state.last_utterance),
        )
    }

    fn run_turn(
        &mut self,
        utterance: &str,
        target: Option<&str>,
        caller: Option<&str>,
        metrics: &mut TurnMetrics,
    ) -> (Envelope, Route) {
        let started = Instant::now();
        let result = self.route(utterance, target, caller, metrics);
        metrics.timings.total = started.elapsed();

        tracing::debug!(route = result.1.label(), consulted = ?metrics.consulted, "turn handled");
        result
    }

    fn route(
        &mut self,
        utterance: &str,
        target: Option<&str>,
        caller: Option<&str>,
        metrics: &mut TurnMetrics,
    ) -> (Envelope, Route) {
        if let Some(caller) = caller {
            let started = Instant::now();
            metrics.consulted |= Consulted::CUSTOM_RULES;
            let custom = self.collaborators.custom_rules.match_rule(utterance, caller);
            metrics.timings.custom_rules = started.elapsed();

            if let Some(response) = custom {
                return (Envelope::reply(response), Route::CustomRule);
            }
        }

        let started = Instant::now();
        metrics.consulted |= Consulted::SCORER;
        let confidence = self.evaluate_confidence(utterance);
        metrics.timings.gate = started.elapsed();

        if confidence.is_confident() {
            let started = Instant::now();
            let result = self.dispatch(target, metrics);
            metrics.timings.dispatch = started.elapsed();
            return result;
        }

        let started = Instant::now();
        let result = self.answer_question(utterance, caller, metrics);
        metrics.timings.qa = started.elapsed();
        result
    }

    fn dispatch(&mut self, target: Option<&str>, metrics: &mut TurnMetrics) -> (Envelope, Route) {
        let cx = DispatchContext {
            registry: &mut self.registry,
            catalog: self.collaborators.responses.as_ref(),
            sink: &mut self.sink,
            metrics,
        };
        dispatch_to_root_domain(&self.state, target, cx)
    }

    fn answer_question(
        &mut self,
        utterance: &str,
        caller: Option<&str>,
        metrics: &mut TurnMetrics,
    ) -> (Envelope, Route) {
        if let Some(caller) = caller {
            metrics.consulted |= Consulted::CUSTOM_QA;
            if let Some(answer) = self.collaborators.custom_qa.query(utterance, caller) {
                return (Envelope::reply(answer), Route::CustomQa);
            }
        }

        metrics.consulted |= Consulted::GENERAL_QA;
        if let Some(answer) = self.collaborators.general_qa.query(utterance) {
            return (Envelope::reply(answer), Route::GeneralQa);
        }

        let fallback = if self.state.speech_domain.is_empty() {
            self.options.fallback_reply.clone()
        } else {
            metrics.consulted |= Consulted::RESPONSE_CATALOG;
            self.default_response_for(&self.state.speech_domain)
        };
        (Envelope::reply(fallback), Route::Fallback)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("options", &self.options)
            .field("registry", &self.registry)
            .field("state", &self.state)
            .finish()
    }
}
