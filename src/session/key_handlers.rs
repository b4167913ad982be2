use std::time::Instant;

use tracing::{debug, debug_span};

use super::render::word_count_label;
use super::scheduler::Fired;
use super::types::{KeyEvent, ServiceRequest, SessionResponse, TrainOrigin};
use super::InputSession;

impl InputSession {
    /// The user edited the field; `text` is its full new content.
    pub fn handle_text_change(&mut self, text: &str, now: Instant) -> SessionResponse {
        let _span = debug_span!("handle_text_change", len = text.len()).entered();

        self.text.clear();
        self.text.push_str(text);
        self.scheduler.schedule(text, now);

        let mut resp = SessionResponse::consumed();
        resp.word_count = Some(word_count_label(text));
        if let Some(sentence) = self.auto_learn.observe(text) {
            debug!(%sentence, "auto-learn: sentence completed");
            resp.requests.push(ServiceRequest::Train {
                text: sentence,
                origin: TrainOrigin::AutoLearn,
            });
        }
        resp
    }

    /// Tab / Enter accept the top suggestion when one is shown; otherwise the
    /// key passes through to the field.
    pub fn handle_key(&mut self, key: KeyEvent) -> SessionResponse {
        let _span = debug_span!("handle_key", ?key).entered();

        match key {
            KeyEvent::Tab | KeyEvent::Enter if !self.displayed.is_empty() => {
                self.accept_suggestion(0)
            }
            _ => SessionResponse::not_consumed(),
        }
    }

    /// Fire every deadline that has passed by `now`.
    pub fn tick(&mut self, now: Instant) -> SessionResponse {
        let mut resp = SessionResponse::consumed();

        if let Some(fired) = self.scheduler.fire_due(now) {
            resp.merge(self.apply_fired(fired));
        }

        if self.status.expire_due(now) {
            resp.status = Some(self.status.line());
            resp.requests.push(self.status.request_fetch());
        }

        resp
    }

    pub(super) fn apply_fired(&mut self, fired: Fired) -> SessionResponse {
        match fired {
            Fired::Empty { seq } => {
                debug!(seq, "blank text: no prediction call");
                self.show(Vec::new())
            }
            Fired::Request(req) => {
                debug!(seq = req.seq, "prediction issued");
                let mut resp = SessionResponse::consumed();
                resp.requests.push(ServiceRequest::Predict(req));
                resp
            }
        }
    }
}
