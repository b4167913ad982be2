//! Pure view mappings: suggestion list → chip set, text → word-count label.

use unicode_width::UnicodeWidthStr;

pub const PLACEHOLDER: &str = "Continue typing...";

/// One clickable suggestion. Clicking it accepts `word`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub word: String,
    pub index: usize,
    /// Display columns of `word`, for text-mode hosts.
    pub width: usize,
}

/// Full contents of the suggestion bar. Every render replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionBar {
    /// Non-interactive "continue typing" hint.
    Placeholder,
    Chips(Vec<Chip>),
}

impl SuggestionBar {
    pub fn chips(&self) -> &[Chip] {
        match self {
            Self::Placeholder => &[],
            Self::Chips(chips) => chips,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// Single-line rendering, e.g. `[ you ] [ are ]`.
    pub fn to_line(&self) -> String {
        match self {
            Self::Placeholder => PLACEHOLDER.to_string(),
            Self::Chips(chips) => chips
                .iter()
                .map(|c| format!("[ {} ]", c.word))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Chip indices aligned under the words of `to_line()`, e.g.
    /// `  0       1` for `[ you ] [ are ]`. Empty for the placeholder.
    pub fn index_line(&self) -> String {
        let mut line = String::new();
        for chip in self.chips() {
            let label = chip.index.to_string();
            line.push_str("  ");
            line.push_str(&label);
            // "[ " + word + " ]" + one separating space
            let pad = (chip.width + 3).saturating_sub(label.len());
            line.push_str(&" ".repeat(pad));
        }
        line.truncate(line.trim_end().len());
        line
    }
}

pub fn render_suggestions(words: &[String]) -> SuggestionBar {
    if words.is_empty() {
        return SuggestionBar::Placeholder;
    }
    SuggestionBar::Chips(
        words
            .iter()
            .enumerate()
            .map(|(index, word)| Chip {
                word: word.clone(),
                index,
                width: word.width(),
            })
            .collect(),
    )
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn word_count_label(text: &str) -> String {
    let count = word_count(text);
    if count == 1 {
        "1 word".to_string()
    } else {
        format!("{count} words")
    }
}
