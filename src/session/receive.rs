use std::time::Instant;

use tracing::{debug, info, warn};

use super::render::word_count_label;
use super::types::{FailurePolicy, ServiceOutcome, SessionResponse};
use super::InputSession;

pub const TRAINED_MESSAGE: &str = "Model trained successfully!";
pub const CLEARED_MESSAGE: &str = "Dictionary cleared.";

impl InputSession {
    /// Feed back the outcome of a service call.
    /// Returns `None` when nothing visible changes (stale, or a silent failure).
    pub fn receive(&mut self, outcome: ServiceOutcome, now: Instant) -> Option<SessionResponse> {
        match outcome {
            ServiceOutcome::Predicted { seq, result } => {
                if !self.scheduler.accept(seq) {
                    debug!(
                        seq,
                        latest = self.scheduler.last_issued(),
                        "discarding stale prediction"
                    );
                    return None;
                }
                match result {
                    Ok(words) => Some(self.show(words)),
                    Err(e) if e.is_malformed() => {
                        warn!(error = %e, "prediction response malformed");
                        Some(self.show(Vec::new()))
                    }
                    Err(e) => {
                        warn!(error = %e, "prediction failed");
                        match self.config.on_predict_failure {
                            FailurePolicy::Clear => Some(self.show(Vec::new())),
                            FailurePolicy::Keep => None,
                        }
                    }
                }
            }

            ServiceOutcome::Trained { origin, result } => match result {
                Ok(()) => {
                    info!(?origin, "model trained");
                    Some(self.notify_and_refresh(TRAINED_MESSAGE, now))
                }
                Err(e) => {
                    warn!(?origin, error = %e, "training failed");
                    None
                }
            },

            ServiceOutcome::Cleared { result } => match result {
                Ok(()) => {
                    info!("model cleared");
                    self.text.clear();
                    self.auto_learn.reset();
                    let fired = self.scheduler.issue_now("");
                    let mut resp = self.apply_fired(fired);
                    resp.text = Some(String::new());
                    resp.word_count = Some(word_count_label(""));
                    resp.merge(self.notify_and_refresh(CLEARED_MESSAGE, now));
                    Some(resp)
                }
                Err(e) => {
                    warn!(error = %e, "clearing model failed");
                    None
                }
            },

            ServiceOutcome::OrderSet { order, result } => match result {
                Ok(()) => {
                    info!(%order, "model order changed");
                    let mut resp = SessionResponse::consumed();
                    resp.requests.push(self.status.request_fetch());
                    Some(resp)
                }
                Err(e) => {
                    warn!(%order, error = %e, "changing model order failed");
                    None
                }
            },

            ServiceOutcome::Status { seq, result } => match result {
                Ok(status) => {
                    let line = self.status.apply(seq, status)?;
                    let mut resp = SessionResponse::consumed();
                    resp.status = Some(line);
                    Some(resp)
                }
                Err(e) => {
                    warn!(seq, error = %e, "fetching model status failed");
                    None
                }
            },
        }
    }

    fn notify_and_refresh(&mut self, message: &str, now: Instant) -> SessionResponse {
        let mut resp = SessionResponse::consumed();
        resp.status = Some(self.status.notify(message, now, self.config.notification));
        resp.requests.push(self.status.request_fetch());
        resp
    }
}
