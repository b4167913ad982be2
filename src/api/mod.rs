//! UniFFI export layer for native hosts of the predictive-text widget.
//!
//! Each public type here maps to a generated foreign class, struct, or enum.

mod types;
mod widget;

pub use types::{PfChip, PfError, PfEvent, PfKey, PfModelStatus, PfResponse};
pub use widget::PfWidget;

use std::path::Path;

use crate::session::ModelStatus;

// ---------------------------------------------------------------------------
// Top-level functions
// ---------------------------------------------------------------------------

#[uniffi::export]
fn engine_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[uniffi::export]
fn settings_load_config(path: String) -> Result<(), PfError> {
    let content = std::fs::read_to_string(&path).map_err(|e| PfError::Io {
        msg: format!("{path}: {e}"),
    })?;
    crate::settings::init_custom(content)
        .map_err(|e| PfError::InvalidData { msg: e.to_string() })?;
    Ok(())
}

#[uniffi::export]
fn settings_default_config() -> String {
    crate::settings::DEFAULT_SETTINGS_TOML.to_string()
}

#[uniffi::export]
fn trace_init(log_dir: String) {
    crate::trace_init::init_tracing(Path::new(&log_dir));
}

#[uniffi::export]
fn format_model_status(n: i64, patterns: u64) -> String {
    crate::session::format_status(&ModelStatus {
        n: Some(n),
        patterns,
        vocab_size: None,
    })
}

#[uniffi::export]
fn word_count_label(text: String) -> String {
    crate::session::word_count_label(&text)
}

/// The sentence auto-learn would submit for `text`, if any.
#[uniffi::export]
fn completed_sentence(text: String) -> Option<String> {
    crate::session::completed_sentence(&text).map(str::to_string)
}
