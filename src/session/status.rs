//! Model status formatting and the notification overlay on the status line.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Deserializer, Serialize};

use super::types::ServiceRequest;

pub const LOADING_STATUS: &str = "Model: loading...";

/// Number of preceding words the model conditions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NgramOrder {
    Unigram = 1,
    Bigram = 2,
    Trigram = 3,
}

impl NgramOrder {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unigram => "Unigram",
            Self::Bigram => "Bigram",
            Self::Trigram => "Trigram",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("n-gram order must be 1, 2 or 3 (got {0})")]
pub struct InvalidOrder(pub i64);

impl TryFrom<i64> for NgramOrder {
    type Error = InvalidOrder;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Self::Unigram),
            2 => Ok(Self::Bigram),
            3 => Ok(Self::Trigram),
            _ => Err(InvalidOrder(n)),
        }
    }
}

impl TryFrom<u8> for NgramOrder {
    type Error = InvalidOrder;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(n))
    }
}

impl fmt::Display for NgramOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Server-reported model state (`GET /api/status`).
///
/// `n` is kept raw so an out-of-range order still renders. Anything that is
/// not an integer (missing, `null`, `2.5`, `"two"`) reads as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStatus {
    #[serde(default, deserialize_with = "lenient_order")]
    pub n: Option<i64>,
    pub patterns: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocab_size: Option<u64>,
}

fn lenient_order<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(serde_json::Value::deserialize(deserializer)?.as_i64())
}

impl ModelStatus {
    pub fn order(&self) -> Option<NgramOrder> {
        self.n.and_then(|n| NgramOrder::try_from(n).ok())
    }
}

pub fn format_status(status: &ModelStatus) -> String {
    let label = match status.order() {
        Some(order) => order.label().to_string(),
        None => match status.n {
            Some(n) => format!("Unknown (n={n})"),
            None => "Unknown (n=?)".to_string(),
        },
    };
    format!("Model: {} ({} patterns)", label, status.patterns)
}

/// Text of the status line and whether a notification is covering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub notification: bool,
}

struct Notification {
    message: String,
    until: Instant,
}

/// Status line owner: last applied status plus an optional timed overlay.
///
/// There is a single overlay slot, so a newer notification replaces the older
/// one together with its expiry; nothing from the older one fires later.
pub(crate) struct StatusDisplay {
    current: Option<ModelStatus>,
    overlay: Option<Notification>,
    last_requested: u64,
    last_applied: u64,
}

impl StatusDisplay {
    pub(crate) fn new() -> Self {
        Self {
            current: None,
            overlay: None,
            last_requested: 0,
            last_applied: 0,
        }
    }

    pub(crate) fn current(&self) -> Option<&ModelStatus> {
        self.current.as_ref()
    }

    pub(crate) fn request_fetch(&mut self) -> ServiceRequest {
        self.last_requested += 1;
        ServiceRequest::FetchStatus {
            seq: self.last_requested,
        }
    }

    /// Apply a fetched status. Returns the line to show, or `None` when the
    /// fetch was superseded or an overlay is up (the status is still stored).
    pub(crate) fn apply(&mut self, seq: u64, status: ModelStatus) -> Option<StatusLine> {
        if seq <= self.last_applied {
            return None;
        }
        self.last_applied = seq;
        self.current = Some(status);
        if self.overlay.is_some() {
            None
        } else {
            Some(self.line())
        }
    }

    pub(crate) fn notify(&mut self, message: &str, now: Instant, duration: Duration) -> StatusLine {
        self.overlay = Some(Notification {
            message: message.to_string(),
            until: now + duration,
        });
        self.line()
    }

    /// Drop the overlay if it has expired. Returns true when it did.
    pub(crate) fn expire_due(&mut self, now: Instant) -> bool {
        match &self.overlay {
            Some(n) if n.until <= now => {
                self.overlay = None;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.overlay.as_ref().map(|n| n.until)
    }

    pub(crate) fn line(&self) -> StatusLine {
        if let Some(n) = &self.overlay {
            return StatusLine {
                text: n.message.clone(),
                notification: true,
            };
        }
        StatusLine {
            text: self
                .current
                .as_ref()
                .map(format_status)
                .unwrap_or_else(|| LOADING_STATUS.to_string()),
            notification: false,
        }
    }
}
