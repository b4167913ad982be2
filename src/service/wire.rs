//! JSON bodies exchanged with the model service.

use serde::{Deserialize, Serialize};

use crate::session::ModelStatus;

#[derive(Serialize)]
pub(super) struct TextBody<'a> {
    pub text: &'a str,
}

#[derive(Serialize)]
pub(super) struct OrderBody {
    pub n: u8,
}

#[derive(Deserialize)]
struct PredictBody {
    /// Missing or null degrades to no suggestions.
    #[serde(default)]
    predictions: Option<Vec<WirePrediction>>,
}

/// A prediction is either a bare word or `{ "word": ..., "score": ... }`;
/// the score is ignored.
#[derive(Deserialize)]
#[serde(untagged)]
enum WirePrediction {
    Word(String),
    Scored { word: String },
}

impl WirePrediction {
    fn into_word(self) -> String {
        match self {
            Self::Word(w) | Self::Scored { word: w } => w,
        }
    }
}

/// Parse a `/api/predict` body into ranked words.
pub fn parse_predictions(body: &str) -> Result<Vec<String>, String> {
    let parsed: PredictBody = serde_json::from_str(body).map_err(|e| e.to_string())?;
    Ok(parsed
        .predictions
        .unwrap_or_default()
        .into_iter()
        .map(WirePrediction::into_word)
        .collect())
}

/// Parse a `/api/status` body.
pub fn parse_status(body: &str) -> Result<ModelStatus, String> {
    serde_json::from_str(body).map_err(|e| e.to_string())
}
