//! Turn metrics.
//!
//! Small structs used to observe routing: which branch answered, which collaborators were
//! consulted on the way, and how long each stage took. They are always collected (the cost is
//! a handful of `Instant::now` calls) but only surfaced through
//! [`Session::handle_turn_verbose`](crate::Session::handle_turn_verbose).

use crate::api::TurnTimings;

bitflags::bitflags! {
    /// Collaborators called during a turn.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Consulted: u8 {
        const CUSTOM_RULES     = 1 << 0;
        const SCORER           = 1 << 1;
        const TASK_HANDLER     = 1 << 2;
        const RESPONSE_CATALOG = 1 << 3;
        const CUSTOM_QA        = 1 << 4;
        const GENERAL_QA       = 1 << 5;
        const DIAGNOSTIC_SINK  = 1 << 6;
    }
}

/// The branch of the pipeline that produced the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// A caller-scoped custom rule answered.
    CustomRule,
    /// A task handler answered in one pass.
    TaskAnswer,
    /// A task handler is mid-task and posed the next slot question.
    TaskContinuation,
    /// Confident match, but nothing handles the root domain.
    MissingHandler,
    CustomQa,
    GeneralQa,
    /// Neither QA base answered.
    Fallback,
}

impl Route {
    pub fn label(self) -> &'static str {
        match self {
            Route::CustomRule => "custom rule",
            Route::TaskAnswer => "task answer",
            Route::TaskContinuation => "task continuation",
            Route::MissingHandler => "missing handler",
            Route::CustomQa => "custom qa",
            Route::GeneralQa => "general qa",
            Route::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TurnMetrics {
    pub consulted: Consulted,
    pub missing_handler: Option<String>,
    pub timings: TurnTimings,
}
