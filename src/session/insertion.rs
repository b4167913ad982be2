use tracing::debug;

use super::render::word_count_label;
use super::types::SessionResponse;
use super::InputSession;

/// `text` with `word` appended: one separating space unless `text` already
/// ends in one, and one trailing space for the next word.
pub fn append_suggestion(text: &str, word: &str) -> String {
    let separator = if text.ends_with(' ') { "" } else { " " };
    let mut out = String::with_capacity(text.len() + separator.len() + word.len() + 1);
    out.push_str(text);
    out.push_str(separator);
    out.push_str(word);
    out.push(' ');
    out
}

impl InputSession {
    /// Accept the displayed suggestion at `index` (click on a chip; Tab/Enter
    /// use index 0). Not consumed when there is no such suggestion.
    pub fn accept_suggestion(&mut self, index: usize) -> SessionResponse {
        let Some(word) = self.displayed.get(index).cloned() else {
            return SessionResponse::not_consumed();
        };
        debug!(%word, index, "suggestion accepted");

        self.text = append_suggestion(&self.text, &word);
        self.auto_learn.record(&self.text);

        // Deliberate action: bypass the debounce window.
        let fired = self.scheduler.issue_now(&self.text);
        let mut resp = self.apply_fired(fired);
        resp.consumed = true;
        resp.text = Some(self.text.clone());
        resp.word_count = Some(word_count_label(&self.text));
        resp.focus_input = true;
        resp
    }
}
