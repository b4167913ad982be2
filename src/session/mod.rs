//! Interaction engine behind the predictive-text widget.
//!
//! `InputSession` owns the editor text and every timer. The host reports text
//! changes, key presses, clock ticks and service outcomes; each call returns a
//! `SessionResponse` describing what to draw and which service calls to run.

mod actions;
mod auto_learn;
mod insertion;
mod key_handlers;
mod receive;
pub mod render;
mod scheduler;
pub mod status;
mod types;

#[cfg(test)]
mod tests;

use std::time::Instant;

pub use auto_learn::completed_sentence;
pub use insertion::append_suggestion;
pub use render::{render_suggestions, word_count_label, Chip, SuggestionBar};
pub use status::{format_status, InvalidOrder, ModelStatus, NgramOrder, StatusLine};
pub use types::{
    FailurePolicy, KeyEvent, PredictState, PredictionRequest, ServiceOutcome, ServiceRequest,
    SessionConfig, SessionResponse, SuggestionAction, TrainOrigin,
};

use auto_learn::AutoLearn;
use scheduler::PredictionScheduler;
use status::StatusDisplay;

pub struct InputSession {
    config: SessionConfig,
    text: String,
    scheduler: PredictionScheduler,
    auto_learn: AutoLearn,
    /// Words currently rendered as chips, best first.
    displayed: Vec<String>,
    status: StatusDisplay,
}

impl InputSession {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            scheduler: PredictionScheduler::new(config.debounce),
            auto_learn: AutoLearn::new(config.auto_learn),
            config,
            text: String::new(),
            displayed: Vec::new(),
            status: StatusDisplay::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn suggestions(&self) -> &[String] {
        &self.displayed
    }

    pub fn predict_state(&self) -> PredictState {
        self.scheduler.state()
    }

    /// Sequence number of the newest prediction issued (0 before the first).
    pub fn prediction_seq(&self) -> u64 {
        self.scheduler.last_issued()
    }

    pub fn auto_learn_enabled(&self) -> bool {
        self.auto_learn.is_enabled()
    }

    pub fn set_auto_learn(&mut self, enabled: bool) {
        self.auto_learn.set_enabled(enabled);
    }

    pub fn model_status(&self) -> Option<&ModelStatus> {
        self.status.current()
    }

    pub fn status_line(&self) -> StatusLine {
        self.status.line()
    }

    /// Earliest armed deadline; the host should call `tick` no later than this.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.scheduler.deadline(), self.status.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Replace the chips with `words` (blank entries dropped).
    fn show(&mut self, words: Vec<String>) -> SessionResponse {
        self.displayed = words.into_iter().filter(|w| !w.trim().is_empty()).collect();
        let mut resp = SessionResponse::consumed();
        resp.suggestions = SuggestionAction::Render(render_suggestions(&self.displayed));
        resp
    }
}

impl Default for InputSession {
    fn default() -> Self {
        Self::new()
    }
}
