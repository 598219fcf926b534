//! Root-domain dispatch.
//!
//! Once the gate is confident, the turn belongs to whatever task handler is registered for the
//! matched root domain. A missing handler is recovered here: the turn goes silent and the
//! domain is logged, the conversation carries on.

use super::metrics::{Consulted, Route, TurnMetrics};
use super::registry::HandlerRegistry;
use super::state::SessionState;
use crate::api::Envelope;
use crate::collab::{NextQuery, ResponseCatalog};
use std::io::Write;

/// Canned reply for `domain`, or a fixed apology naming it.
pub fn default_response_for(catalog: &dyn ResponseCatalog, domain: &str) -> String {
    match catalog.response_for(domain) {
        Some(response) => response,
        None => format!("I believe this relates to «{domain}» but have no configured reply yet"),
    }
}

pub(crate) struct DispatchContext<'a> {
    pub registry: &'a mut HandlerRegistry,
    pub catalog: &'a dyn ResponseCatalog,
    pub sink: &'a mut dyn Write,
    pub metrics: &'a mut TurnMetrics,
}

pub(crate) fn dispatch_to_root_domain(
    state: &SessionState,
    target: Option<&str>,
    cx: DispatchContext<'_>,
) -> (Envelope, Route) {
    let root = state.root_domain();

    let Some(handler) = cx.registry.lookup(root) else {
        tracing::warn!(domain = %root, "no task handler implemented for domain");
        cx.metrics.missing_handler = Some(root.to_string());
        return (Envelope::silent(), Route::MissingHandler);
    };

    cx.metrics.consulted |= Consulted::TASK_HANDLER;
    let reply = handler.respond(&state.last_utterance, &state.speech_domain, target);

    let response = match reply.response {
        Some(response) => response,
        None => {
            cx.metrics.consulted |= Consulted::RESPONSE_CATALOG;
            default_response_for(cx.catalog, &state.speech_domain)
        }
    };

    let Some(status) = reply.status else {
        return (Envelope::reply(response), Route::TaskAnswer);
    };

    let NextQuery { target, candidates } = handler.next_query();

    cx.metrics.consulted |= Consulted::DIAGNOSTIC_SINK;
    if let Err(err) = handler.trace(cx.sink).and_then(|_| cx.sink.flush()) {
        tracing::warn!(domain = %root, error = %err, "failed to write task trace");
    }

    tracing::debug!(domain = %root, %status, %target, candidates = candidates.len(), "task continues");
    (Envelope::continuing(response, status, target, candidates), Route::TaskContinuation)
}
