use std::time::Duration;

use serde::Deserialize;

use super::render::SuggestionBar;
use super::status::{ModelStatus, NgramOrder, StatusLine};
use crate::service::ServiceError;
use crate::settings::Settings;

/// What the suggestion bar does when a prediction call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Replace the chips with the placeholder.
    Clear,
    /// Leave whatever is displayed in place.
    Keep,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub debounce: Duration,
    pub notification: Duration,
    pub on_predict_failure: FailurePolicy,
    pub auto_learn: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            notification: Duration::from_millis(2000),
            on_predict_failure: FailurePolicy::Clear,
            auto_learn: false,
        }
    }
}

impl SessionConfig {
    pub fn from_settings(s: &Settings) -> Self {
        Self {
            debounce: Duration::from_millis(s.prediction.debounce_ms),
            notification: Duration::from_millis(s.status.notification_ms),
            on_predict_failure: s.prediction.on_failure,
            auto_learn: s.auto_learn.enabled,
        }
    }
}

/// Where the prediction stream stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictState {
    Idle,
    AwaitingDebounce,
    AwaitingResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Tab,
    Enter,
    /// Any other key; never intercepted.
    Other,
}

/// A prediction call tagged with the sequence number it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    pub text: String,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainOrigin {
    /// Sentence completed in the editor while auto-learn was on.
    AutoLearn,
    /// Explicit "train" action on a pasted corpus.
    Manual,
}

/// A call the host must run against the model service (see `service::execute`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceRequest {
    Predict(PredictionRequest),
    Train { text: String, origin: TrainOrigin },
    Clear,
    SetOrder(NgramOrder),
    FetchStatus { seq: u64 },
}

/// Result of a `ServiceRequest`, fed back through `InputSession::receive`.
#[derive(Debug, Clone)]
pub enum ServiceOutcome {
    Predicted {
        seq: u64,
        result: Result<Vec<String>, ServiceError>,
    },
    Trained {
        origin: TrainOrigin,
        result: Result<(), ServiceError>,
    },
    Cleared {
        result: Result<(), ServiceError>,
    },
    OrderSet {
        order: NgramOrder,
        result: Result<(), ServiceError>,
    },
    Status {
        seq: u64,
        result: Result<ModelStatus, ServiceError>,
    },
}

/// Suggestion bar action: re-render or leave as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionAction {
    Keep,
    Render(SuggestionBar),
}

/// Everything the host has to do after a session call.
#[derive(Debug)]
pub struct SessionResponse {
    /// For key events: whether the default action must be suppressed.
    pub consumed: bool,
    /// New editor content when the engine itself rewrote the text.
    pub text: Option<String>,
    pub word_count: Option<String>,
    pub suggestions: SuggestionAction,
    pub status: Option<StatusLine>,
    pub focus_input: bool,
    pub requests: Vec<ServiceRequest>,
}

impl SessionResponse {
    pub(super) fn not_consumed() -> Self {
        Self {
            consumed: false,
            text: None,
            word_count: None,
            suggestions: SuggestionAction::Keep,
            status: None,
            focus_input: false,
            requests: Vec::new(),
        }
    }

    pub(super) fn consumed() -> Self {
        Self {
            consumed: true,
            ..Self::not_consumed()
        }
    }

    /// Fold `other` into `self`; later display fields win, requests accumulate.
    pub(crate) fn merge(&mut self, other: SessionResponse) {
        self.consumed |= other.consumed;
        if other.text.is_some() {
            self.text = other.text;
        }
        if other.word_count.is_some() {
            self.word_count = other.word_count;
        }
        if let SuggestionAction::Render(_) = other.suggestions {
            self.suggestions = other.suggestions;
        }
        if other.status.is_some() {
            self.status = other.status;
        }
        self.focus_input |= other.focus_input;
        self.requests.extend(other.requests);
    }

    /// True when the host has nothing to apply.
    pub fn is_noop(&self) -> bool {
        self.text.is_none()
            && self.word_count.is_none()
            && self.suggestions == SuggestionAction::Keep
            && self.status.is_none()
            && !self.focus_input
            && self.requests.is_empty()
    }
}
