//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;
use std::time::Duration;

use serde::Deserialize;

use crate::session::FailurePolicy;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub service: ServiceSettings,
    pub prediction: PredictionSettings,
    pub status: StatusSettings,
    pub auto_learn: AutoLearnSettings,
    pub trace: TraceSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSettings {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl ServiceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionSettings {
    pub debounce_ms: u64,
    pub on_failure: FailurePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusSettings {
    pub notification_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutoLearnSettings {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraceSettings {
    pub filter: String,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_positive!(service.timeout_ms);
    check_positive!(prediction.debounce_ms);
    check_positive!(status.notification_ms);

    let url = s.service.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(SettingsError::InvalidValue {
            field: "service.base_url".to_string(),
            reason: "must start with http:// or https://".to_string(),
        });
    }

    if s.trace.filter.trim().is_empty() {
        return Err(SettingsError::InvalidValue {
            field: "trace.filter".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_toml() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s.service.base_url, "http://127.0.0.1:5000");
        assert_eq!(s.service.timeout(), Duration::from_millis(2000));
        assert_eq!(s.prediction.debounce_ms, 300);
        assert_eq!(s.prediction.on_failure, FailurePolicy::Clear);
        assert_eq!(s.status.notification_ms, 2000);
        assert!(!s.auto_learn.enabled);
        assert_eq!(s.trace.filter, "predictflow=debug");
    }

    #[test]
    fn parse_valid_custom_toml() {
        let toml = r#"
[service]
base_url = "https://model.example.org"
timeout_ms = 500

[prediction]
debounce_ms = 150
on_failure = "keep"

[status]
notification_ms = 1000

[auto_learn]
enabled = true

[trace]
filter = "predictflow::session=trace,warn"
"#;
        let s = parse_settings_toml(toml).unwrap();
        assert_eq!(s.service.base_url, "https://model.example.org");
        assert_eq!(s.prediction.debounce_ms, 150);
        assert_eq!(s.prediction.on_failure, FailurePolicy::Keep);
        assert!(s.auto_learn.enabled);
        assert_eq!(s.trace.filter, "predictflow::session=trace,warn");
    }

    #[test]
    fn error_empty_trace_filter() {
        let toml = DEFAULT_SETTINGS_TOML
            .replace(r#"filter = "predictflow=debug""#, r#"filter = " ""#);
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("trace.filter"));
    }

    #[test]
    fn error_zero_debounce() {
        let toml = r#"
[service]
base_url = "http://127.0.0.1:5000"
timeout_ms = 2000

[prediction]
debounce_ms = 0
on_failure = "clear"

[status]
notification_ms = 2000

[auto_learn]
enabled = false

[trace]
filter = "predictflow=debug"
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
        assert!(err.to_string().contains("prediction.debounce_ms"));
    }

    #[test]
    fn error_bad_base_url() {
        let toml = r#"
[service]
base_url = "127.0.0.1:5000"
timeout_ms = 2000

[prediction]
debounce_ms = 300
on_failure = "clear"

[status]
notification_ms = 2000

[auto_learn]
enabled = false

[trace]
filter = "predictflow=debug"
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(err.to_string().contains("service.base_url"));
    }

    #[test]
    fn error_unknown_failure_policy() {
        let toml = r#"
[service]
base_url = "http://127.0.0.1:5000"
timeout_ms = 2000

[prediction]
debounce_ms = 300
on_failure = "retry"

[status]
notification_ms = 2000

[auto_learn]
enabled = false

[trace]
filter = "predictflow=debug"
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn error_invalid_toml() {
        let err = parse_settings_toml("not valid toml {{{").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn error_missing_section() {
        let toml = r#"
[service]
base_url = "http://127.0.0.1:5000"
timeout_ms = 2000
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, DEFAULT_SETTINGS_TOML.replace("300", "250")).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let s = parse_settings_toml(&content).unwrap();
        assert_eq!(s.prediction.debounce_ms, 250);
    }
}
