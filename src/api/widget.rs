use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::service::{HttpModelService, ModelService};
use crate::session::{InputSession, NgramOrder, SessionConfig, SessionResponse};
use crate::worker::AsyncWorker;

use super::types::convert_to_events;
use super::{PfError, PfKey, PfModelStatus, PfResponse};

/// The widget as seen by a native host: forward UI events in, apply the
/// returned events, and call `tick` / `poll` when asked to.
#[derive(uniffi::Object)]
pub struct PfWidget {
    session: Mutex<InputSession>,
    worker: AsyncWorker,
}

#[uniffi::export]
impl PfWidget {
    /// Widget configured from the global settings.
    #[uniffi::constructor]
    pub fn new() -> Arc<Self> {
        let settings = crate::settings::settings();
        Self::with_service(
            Arc::new(HttpModelService::from_settings(&settings.service)),
            SessionConfig::from_settings(settings),
        )
    }

    /// Widget talking to `base_url`, other settings global.
    #[uniffi::constructor]
    pub fn with_url(base_url: String) -> Arc<Self> {
        let settings = crate::settings::settings();
        Self::with_service(
            Arc::new(HttpModelService::new(&base_url, settings.service.timeout())),
            SessionConfig::from_settings(settings),
        )
    }

    fn start(&self) -> PfResponse {
        let mut session = self.session();
        let resp = session.start();
        self.dispatch(&session, resp)
    }

    fn text_changed(&self, text: String) -> PfResponse {
        let mut session = self.session();
        let resp = session.handle_text_change(&text, Instant::now());
        self.dispatch(&session, resp)
    }

    fn key_down(&self, key: PfKey) -> PfResponse {
        let mut session = self.session();
        let resp = session.handle_key(key.into());
        self.dispatch(&session, resp)
    }

    fn chip_clicked(&self, index: u32) -> PfResponse {
        let mut session = self.session();
        let resp = session.accept_suggestion(index as usize);
        self.dispatch(&session, resp)
    }

    /// Train on a pasted corpus. `consumed == false` means it was blank.
    fn train(&self, corpus: String) -> PfResponse {
        let mut session = self.session();
        let resp = session.train_corpus(&corpus);
        self.dispatch(&session, resp)
    }

    /// Clear the model. Ask the user first; this cannot be undone.
    fn clear(&self) -> PfResponse {
        let mut session = self.session();
        let resp = session.clear_model();
        self.dispatch(&session, resp)
    }

    fn set_order(&self, n: u8) -> Result<PfResponse, PfError> {
        let order =
            NgramOrder::try_from(n).map_err(|e| PfError::InvalidData { msg: e.to_string() })?;
        let mut session = self.session();
        let resp = session.set_order(order);
        Ok(self.dispatch(&session, resp))
    }

    fn set_auto_learn(&self, enabled: bool) {
        self.session().set_auto_learn(enabled);
    }

    fn auto_learn_enabled(&self) -> bool {
        self.session().auto_learn_enabled()
    }

    /// Fire due timers (debounce, notification revert).
    fn tick(&self) -> PfResponse {
        let mut session = self.session();
        let resp = session.tick(Instant::now());
        self.dispatch(&session, resp)
    }

    /// Apply finished service calls. `None` when nothing visible changed.
    fn poll(&self) -> Option<PfResponse> {
        let mut session = self.session();
        let now = Instant::now();
        let mut merged: Option<SessionResponse> = None;
        while let Some(outcome) = self.worker.try_recv() {
            if let Some(resp) = session.receive(outcome, now) {
                merged = Some(match merged.take() {
                    Some(mut m) => {
                        m.merge(resp);
                        m
                    }
                    None => resp,
                });
            }
        }
        merged.map(|resp| self.dispatch(&session, resp))
    }

    fn has_pending_work(&self) -> bool {
        self.worker.has_pending()
    }

    fn text(&self) -> String {
        self.session().text().to_string()
    }

    fn model_status(&self) -> Option<PfModelStatus> {
        self.session().model_status().map(|s| PfModelStatus {
            n: s.n,
            patterns: s.patterns,
            vocab_size: s.vocab_size,
            label: crate::session::format_status(s),
        })
    }
}

impl PfWidget {
    pub(crate) fn with_service(service: Arc<dyn ModelService>, config: SessionConfig) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(InputSession::with_config(config)),
            worker: AsyncWorker::new(service),
        })
    }

    fn session(&self) -> MutexGuard<'_, InputSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand the response's service calls to the worker and convert the rest
    /// into host events.
    fn dispatch(&self, session: &InputSession, mut resp: SessionResponse) -> PfResponse {
        self.worker.invalidate_predictions(session.prediction_seq());
        for request in std::mem::take(&mut resp.requests) {
            self.worker.submit(request);
        }
        let next_tick_ms = session.next_deadline().map(|deadline| {
            deadline
                .saturating_duration_since(Instant::now())
                .as_millis() as u64
        });
        convert_to_events(resp, self.worker.has_pending(), next_tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::api::PfEvent;
    use crate::service::ServiceError;
    use crate::session::{FailurePolicy, ModelStatus};

    struct StaticService;

    impl ModelService for StaticService {
        fn predict(&self, text: &str) -> Result<Vec<String>, ServiceError> {
            if text.trim_end().ends_with("how") {
                Ok(vec!["are".to_string(), "is".to_string()])
            } else {
                Ok(vec!["you".to_string()])
            }
        }
        fn train(&self, _text: &str) -> Result<(), ServiceError> {
            Ok(())
        }
        fn clear(&self) -> Result<(), ServiceError> {
            Ok(())
        }
        fn set_order(&self, _order: NgramOrder) -> Result<(), ServiceError> {
            Ok(())
        }
        fn status(&self) -> Result<ModelStatus, ServiceError> {
            Ok(ModelStatus {
                n: Some(2),
                patterns: 16,
                vocab_size: Some(40),
            })
        }
    }

    fn widget() -> Arc<PfWidget> {
        PfWidget::with_service(
            Arc::new(StaticService),
            SessionConfig {
                debounce: Duration::from_millis(10),
                notification: Duration::from_millis(20),
                on_predict_failure: FailurePolicy::Clear,
                auto_learn: false,
            },
        )
    }

    /// Poll until the worker is idle, collecting every event.
    fn settle(w: &PfWidget) -> Vec<PfEvent> {
        let mut events = Vec::new();
        for _ in 0..500 {
            if let Some(resp) = w.poll() {
                events.extend(resp.events);
            }
            if !w.has_pending_work() {
                if let Some(resp) = w.poll() {
                    events.extend(resp.events);
                }
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }
        events
    }

    #[test]
    fn start_fetches_status() {
        let w = widget();
        let resp = w.start();
        assert!(resp.events.contains(&PfEvent::SetWordCount {
            label: "0 words".to_string()
        }));
        assert!(resp.events.contains(&PfEvent::SchedulePoll));
        let events = settle(&w);
        assert!(events.contains(&PfEvent::SetStatus {
            text: "Model: Bigram (16 patterns)".to_string(),
            notification: false
        }));
        assert_eq!(w.model_status().map(|s| s.vocab_size), Some(Some(40)));
    }

    #[test]
    fn typing_then_tab_inserts_first_chip() {
        let w = widget();
        let resp = w.text_changed("hello how".to_string());
        assert!(resp
            .events
            .iter()
            .any(|e| matches!(e, PfEvent::ScheduleTick { .. })));

        // No suggestions yet: Tab passes through.
        assert!(!w.key_down(PfKey::Tab).consumed);

        thread::sleep(Duration::from_millis(15));
        w.tick();
        let events = settle(&w);
        assert!(events.iter().any(|e| matches!(
            e,
            PfEvent::ShowChips { chips } if chips.len() == 2 && chips[0].word == "are"
        )));

        let resp = w.key_down(PfKey::Tab);
        assert!(resp.consumed);
        assert!(resp.events.contains(&PfEvent::SetText {
            text: "hello how are ".to_string()
        }));
        assert!(resp.events.contains(&PfEvent::FocusInput));
        assert_eq!(w.text(), "hello how are ");
    }

    #[test]
    fn rejects_invalid_order() {
        let w = widget();
        assert!(matches!(w.set_order(4), Err(PfError::InvalidData { .. })));
        assert!(w.set_order(3).is_ok());
    }

    #[test]
    fn blank_corpus_is_not_consumed() {
        let w = widget();
        assert!(!w.train("   ".to_string()).consumed);
        assert!(w.train("hope you are well".to_string()).consumed);
        let events = settle(&w);
        assert!(events.contains(&PfEvent::SetStatus {
            text: "Model trained successfully!".to_string(),
            notification: true
        }));
    }
}
