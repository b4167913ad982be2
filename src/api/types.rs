use crate::session::{KeyEvent, SessionResponse, SuggestionAction, SuggestionBar};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PfError {
    #[error("IO error: {msg}")]
    Io { msg: String },
    #[error("invalid data: {msg}")]
    InvalidData { msg: String },
}

// ---------------------------------------------------------------------------
// Records (value types, copied across FFI boundary)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct PfChip {
    pub word: String,
    pub index: u32,
}

#[derive(Clone, Debug, uniffi::Record)]
pub struct PfModelStatus {
    /// `None` when the service reported something other than an integer.
    pub n: Option<i64>,
    pub patterns: u64,
    pub vocab_size: Option<u64>,
    pub label: String,
}

/// Event-driven response from every widget call.
#[derive(Debug, uniffi::Record)]
pub struct PfResponse {
    /// For key events: suppress the default action.
    pub consumed: bool,
    pub events: Vec<PfEvent>,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, uniffi::Enum)]
pub enum PfKey {
    Tab,
    Enter,
    Other,
}

impl From<PfKey> for KeyEvent {
    fn from(key: PfKey) -> Self {
        match key {
            PfKey::Tab => KeyEvent::Tab,
            PfKey::Enter => KeyEvent::Enter,
            PfKey::Other => KeyEvent::Other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum PfEvent {
    SetText { text: String },
    SetWordCount { label: String },
    ShowPlaceholder { text: String },
    ShowChips { chips: Vec<PfChip> },
    SetStatus { text: String, notification: bool },
    FocusInput,
    /// Service work is in flight; call `poll` soon.
    SchedulePoll,
    /// A timer is armed; call `tick` after `delay_ms`.
    ScheduleTick { delay_ms: u64 },
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

pub(super) fn convert_to_events(
    resp: SessionResponse,
    has_pending_work: bool,
    next_tick_ms: Option<u64>,
) -> PfResponse {
    let mut events = Vec::new();

    // 1. Text written by the engine
    if let Some(text) = resp.text {
        events.push(PfEvent::SetText { text });
    }

    // 2. Word count
    if let Some(label) = resp.word_count {
        events.push(PfEvent::SetWordCount { label });
    }

    // 3. Suggestion bar
    if let SuggestionAction::Render(bar) = resp.suggestions {
        events.push(match bar {
            SuggestionBar::Placeholder => PfEvent::ShowPlaceholder {
                text: crate::session::render::PLACEHOLDER.to_string(),
            },
            SuggestionBar::Chips(chips) => PfEvent::ShowChips {
                chips: chips
                    .into_iter()
                    .map(|c| PfChip {
                        word: c.word,
                        index: c.index as u32,
                    })
                    .collect(),
            },
        });
    }

    // 4. Status line
    if let Some(line) = resp.status {
        events.push(PfEvent::SetStatus {
            text: line.text,
            notification: line.notification,
        });
    }

    // 5. Focus
    if resp.focus_input {
        events.push(PfEvent::FocusInput);
    }

    // 6. Follow-up scheduling
    if has_pending_work {
        events.push(PfEvent::SchedulePoll);
    }
    if let Some(delay_ms) = next_tick_ms {
        events.push(PfEvent::ScheduleTick { delay_ms });
    }

    PfResponse {
        consumed: resp.consumed,
        events,
    }
}
