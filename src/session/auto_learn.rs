//! Sentence-completion detection for auto-learn.

const TERMINATOR: char = '.';

/// The sentence just closed by a trailing terminator, if any.
///
/// `"The cat sat."` yields `"The cat sat"`, `"Two. Three."` yields `"Three"`,
/// `"Hi.."` yields nothing (the second terminator closes an empty sentence).
pub fn completed_sentence(text: &str) -> Option<&str> {
    let body = text.trim().strip_suffix(TERMINATOR)?;
    let last = match body.rfind(TERMINATOR) {
        Some(i) => &body[i + TERMINATOR.len_utf8()..],
        None => body,
    };
    let sentence = last.trim();
    if sentence.is_empty() {
        None
    } else {
        Some(sentence)
    }
}

pub(crate) struct AutoLearn {
    enabled: bool,
    /// Trimmed text as of the last change, recorded whether enabled or not.
    last_seen: String,
}

impl AutoLearn {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last_seen: String::new(),
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn reset(&mut self) {
        self.last_seen.clear();
    }

    /// Note text the engine wrote itself. Never fires.
    pub(crate) fn record(&mut self, text: &str) {
        self.last_seen.clear();
        self.last_seen.push_str(text.trim());
    }

    /// Observe a text change; returns the sentence to submit for training.
    ///
    /// Fires only when the change appended a terminator to unterminated text.
    /// Edits anywhere else in a finished sentence leave it alone.
    pub(crate) fn observe(&mut self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        let appended = !self.last_seen.ends_with(TERMINATOR)
            && trimmed
                .strip_suffix(TERMINATOR)
                .is_some_and(|body| body.trim_end() == self.last_seen);
        self.record(trimmed);
        if !(self.enabled && appended) {
            return None;
        }
        completed_sentence(trimmed).map(str::to_string)
    }
}
