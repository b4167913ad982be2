//! Debounced prediction scheduling with last-issued-wins sequencing.

use std::time::{Duration, Instant};

use super::types::{PredictState, PredictionRequest};

/// What happened when the debounce window elapsed (or insertion bypassed it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Fired {
    /// Blank text: no call is made, the bar shows the placeholder.
    Empty { seq: u64 },
    Request(PredictionRequest),
}

pub(crate) struct PredictionScheduler {
    debounce: Duration,
    deadline: Option<Instant>,
    pending_text: String,
    /// Highest sequence number issued so far. Blank fires consume one too.
    last_issued: u64,
    /// A call tagged `last_issued` is out and has not been answered.
    awaiting: bool,
}

impl PredictionScheduler {
    pub(crate) fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            deadline: None,
            pending_text: String::new(),
            last_issued: 0,
            awaiting: false,
        }
    }

    /// Arm (or re-arm) the debounce timer for `text`. At most one timer is live.
    pub(crate) fn schedule(&mut self, text: &str, now: Instant) {
        self.deadline = Some(now + self.debounce);
        self.pending_text.clear();
        self.pending_text.push_str(text);
    }

    pub(crate) fn cancel(&mut self) {
        self.deadline = None;
        self.pending_text.clear();
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire the timer if its deadline has passed.
    pub(crate) fn fire_due(&mut self, now: Instant) -> Option<Fired> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                let text = std::mem::take(&mut self.pending_text);
                Some(self.issue(text))
            }
            _ => None,
        }
    }

    /// Issue immediately, dropping any armed timer.
    pub(crate) fn issue_now(&mut self, text: &str) -> Fired {
        self.cancel();
        self.issue(text.to_string())
    }

    fn issue(&mut self, text: String) -> Fired {
        self.last_issued += 1;
        let seq = self.last_issued;
        if text.trim().is_empty() {
            self.awaiting = false;
            Fired::Empty { seq }
        } else {
            self.awaiting = true;
            Fired::Request(PredictionRequest { text, seq })
        }
    }

    /// Whether a response for `seq` may be applied. Accepts at most once per issue.
    pub(crate) fn accept(&mut self, seq: u64) -> bool {
        if self.awaiting && seq == self.last_issued {
            self.awaiting = false;
            true
        } else {
            false
        }
    }

    pub(crate) fn last_issued(&self) -> u64 {
        self.last_issued
    }

    pub(crate) fn state(&self) -> PredictState {
        if self.deadline.is_some() {
            PredictState::AwaitingDebounce
        } else if self.awaiting {
            PredictState::AwaitingResponse
        } else {
            PredictState::Idle
        }
    }
}
