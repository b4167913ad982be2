use super::render::{render_suggestions, word_count_label};
use super::status::NgramOrder;
use super::types::{ServiceRequest, SessionResponse, SuggestionAction, TrainOrigin};
use super::InputSession;

impl InputSession {
    /// Initial paint: empty bar, word count, and the first status fetch.
    pub fn start(&mut self) -> SessionResponse {
        let mut resp = SessionResponse::consumed();
        resp.word_count = Some(word_count_label(&self.text));
        resp.suggestions = SuggestionAction::Render(render_suggestions(&self.displayed));
        resp.status = Some(self.status.line());
        resp.requests.push(self.status.request_fetch());
        resp
    }

    /// Explicit "train" action on a corpus. Not consumed (nothing issued) when
    /// the corpus is blank; otherwise the host should empty its corpus box.
    pub fn train_corpus(&mut self, corpus: &str) -> SessionResponse {
        if corpus.trim().is_empty() {
            return SessionResponse::not_consumed();
        }
        let mut resp = SessionResponse::consumed();
        resp.requests.push(ServiceRequest::Train {
            text: corpus.to_string(),
            origin: TrainOrigin::Manual,
        });
        resp
    }

    /// Wipe the remote model. The host asks for confirmation before calling.
    pub fn clear_model(&mut self) -> SessionResponse {
        let mut resp = SessionResponse::consumed();
        resp.requests.push(ServiceRequest::Clear);
        resp
    }

    pub fn set_order(&mut self, order: NgramOrder) -> SessionResponse {
        let mut resp = SessionResponse::consumed();
        resp.requests.push(ServiceRequest::SetOrder(order));
        resp
    }

    pub fn refresh_status(&mut self) -> SessionResponse {
        let mut resp = SessionResponse::consumed();
        resp.requests.push(self.status.request_fetch());
        resp
    }
}
