use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::warn;

use trekka_core::{CoreError, TripCandidate, TripType};

/// Used when the model omits a confidence score or sends something that is
/// not a number.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("extraction request failed: {0}")]
    Request(String),
    #[error("extraction provider returned {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("extraction response is not a JSON object: {0}")]
    Malformed(String),
    #[error("extraction response has no destination")]
    MissingDestination,
    #[error("extraction is temporarily unavailable")]
    Unavailable,
}

impl From<ExtractionError> for CoreError {
    fn from(err: ExtractionError) -> Self {
        CoreError::ExtractionError(err.to_string())
    }
}

/// Turns one confirmation email into a structured trip candidate.
#[async_trait]
pub trait TripExtractor: Send + Sync {
    async fn extract(&self, subject: &str, body: &str) -> Result<TripCandidate, ExtractionError>;
}

/// Validates raw model output.
///
/// Accepts a bare JSON object, optionally wrapped in a Markdown code fence.
/// Empty strings and the literal `"null"` count as absent.
pub fn parse_candidate(raw: &str) -> Result<TripCandidate, ExtractionError> {
    let value: Value =
        serde_json::from_str(strip_code_fence(raw)).map_err(|e| ExtractionError::Malformed(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(ExtractionError::Malformed(format!("expected an object, got {}", kind(&value))));
    };

    let destination = text_field(&fields, "destination").ok_or(ExtractionError::MissingDestination)?;

    Ok(TripCandidate {
        destination,
        start_date: date_field(&fields, "start_date"),
        end_date: date_field(&fields, "end_date"),
        description: text_field(&fields, "description"),
        trip_type: text_field(&fields, "trip_type").map(|t| TripType::from_label(&t)),
        confirmation_number: text_field(&fields, "confirmation_number"),
        confidence_score: confidence(&fields),
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty() && !s.eq_ignore_ascii_case("null")).then(|| s.to_string())
        }
        // Confirmation numbers sometimes come back as bare numbers.
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn date_field(fields: &Map<String, Value>, key: &str) -> Option<NaiveDate> {
    let raw = text_field(fields, key)?;
    match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            warn!("Discarding {} with unexpected format: {:?}", key, raw);
            None
        }
    }
}

fn confidence(fields: &Map<String, Value>) -> f64 {
    fields
        .get("confidence_score")
        .and_then(Value::as_f64)
        .filter(|score| score.is_finite())
        .map(|score| score.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_CONFIDENCE)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
