
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::service::{Endpoint, ModelService, ServiceError};

use super::{
    InputSession, ModelStatus, NgramOrder, PredictionRequest, ServiceOutcome, ServiceRequest,
    SessionConfig, SessionResponse, SuggestionAction,
};

pub(super) const DEBOUNCE: Duration = Duration::from_millis(300);
pub(super) const NOTIFICATION: Duration = Duration::from_millis(2000);

pub(super) fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub(super) fn make_session() -> InputSession {
    InputSession::with_config(SessionConfig::default())
}

pub(super) fn words(ws: &[&str]) -> Vec<String> {
    ws.iter().map(|w| w.to_string()).collect()
}

// Helper: simulate typing a string one character at a time, `gap` apart
pub(super) fn type_string(
    session: &mut InputSession,
    s: &str,
    start: Instant,
    gap: Duration,
) -> Vec<SessionResponse> {
    let mut text = session.text().to_string();
    let mut now = start;
    let mut responses = Vec::new();
    for ch in s.chars() {
        text.push(ch);
        responses.push(session.handle_text_change(&text, now));
        now += gap;
    }
    responses
}

pub(super) fn predict_requests(resp: &SessionResponse) -> Vec<PredictionRequest> {
    resp.requests
        .iter()
        .filter_map(|r| match r {
            ServiceRequest::Predict(p) => Some(p.clone()),
            _ => None,
        })
        .collect()
}

pub(super) fn train_texts(resp: &SessionResponse) -> Vec<String> {
    resp.requests
        .iter()
        .filter_map(|r| match r {
            ServiceRequest::Train { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub(super) fn predicted(seq: u64, ws: &[&str]) -> ServiceOutcome {
    ServiceOutcome::Predicted {
        seq,
        result: Ok(words(ws)),
    }
}

pub(super) fn chip_words(resp: &SessionResponse) -> Option<Vec<String>> {
    match &resp.suggestions {
        SuggestionAction::Render(bar) => Some(bar.chips().iter().map(|c| c.word.clone()).collect()),
        SuggestionAction::Keep => None,
    }
}

/// Type `text`, let the debounce fire and deliver `ws` as the answer.
/// Returns the time at which the answer was delivered.
pub(super) fn show_suggestions(
    session: &mut InputSession,
    text: &str,
    ws: &[&str],
    t0: Instant,
) -> Instant {
    session.handle_text_change(text, t0);
    let now = t0 + DEBOUNCE;
    let resp = session.tick(now);
    let req = predict_requests(&resp)
        .pop()
        .expect("debounce fired a prediction");
    session
        .receive(predicted(req.seq, ws), now)
        .expect("latest prediction applies");
    now
}

// ---------------------------------------------------------------------------
// In-process model
// ---------------------------------------------------------------------------

/// Bigram counts over lowercased words, good enough to exercise the widget.
pub(super) struct FakeModel {
    inner: Mutex<FakeModelState>,
    failing: AtomicBool,
}

struct FakeModelState {
    order: NgramOrder,
    next: HashMap<String, BTreeMap<String, u32>>,
}

impl FakeModel {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FakeModelState {
                order: NgramOrder::Bigram,
                next: HashMap::new(),
            }),
            failing: AtomicBool::new(false),
        }
    }

    pub fn trained(corpus: &str) -> Self {
        let model = Self::new();
        model.train(corpus).unwrap();
        model
    }

    /// Make every call fail with a transport error until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self, endpoint: Endpoint) -> Result<(), ServiceError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(ServiceError::Transport {
                endpoint,
                msg: "connection refused".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl ModelService for FakeModel {
    fn predict(&self, text: &str) -> Result<Vec<String>, ServiceError> {
        self.check(Endpoint::Predict)?;
        let state = self.inner.lock().unwrap();
        let Some(last) = tokens(text).pop() else {
            return Ok(Vec::new());
        };
        let Some(followers) = state.next.get(&last) else {
            return Ok(Vec::new());
        };
        let mut ranked: Vec<(&String, &u32)> = followers.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        Ok(ranked.into_iter().take(3).map(|(w, _)| w.clone()).collect())
    }

    fn train(&self, text: &str) -> Result<(), ServiceError> {
        self.check(Endpoint::Train)?;
        let mut state = self.inner.lock().unwrap();
        for pair in tokens(text).windows(2) {
            *state
                .next
                .entry(pair[0].clone())
                .or_default()
                .entry(pair[1].clone())
                .or_default() += 1;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), ServiceError> {
        self.check(Endpoint::Clear)?;
        self.inner.lock().unwrap().next.clear();
        Ok(())
    }

    fn set_order(&self, order: NgramOrder) -> Result<(), ServiceError> {
        self.check(Endpoint::Settings)?;
        self.inner.lock().unwrap().order = order;
        Ok(())
    }

    fn status(&self) -> Result<ModelStatus, ServiceError> {
        self.check(Endpoint::Status)?;
        let state = self.inner.lock().unwrap();
        let patterns = state.next.values().map(|f| f.len() as u64).sum();
        let mut vocab: Vec<&String> = state
            .next
            .iter()
            .flat_map(|(w, f)| std::iter::once(w).chain(f.keys()))
            .collect();
        vocab.sort();
        vocab.dedup();
        Ok(ModelStatus {
            n: Some(i64::from(state.order.value())),
            patterns,
            vocab_size: Some(vocab.len() as u64),
        })
    }
}
