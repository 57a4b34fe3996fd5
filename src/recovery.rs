//! Recovery for text-generation replies that came back as JSON.
//!
//! The recognition service is asked for day-line text but sometimes answers
//! with the JSON schedule instead. The gate detects that, renders the JSON
//! through the encoder and hands back text. Anything else passes through.

use crate::encoder::{encode_raw_schedule, EncodeOptions};
use crate::error::CodecError;
use crate::types::RawScheduleDay;

/// Heuristic: trimmed reply starts with `{` or `[`, or mentions a ```json
/// fence, or carries both `"date":` and `"stripes":`.
pub fn looks_like_json(response: &str) -> bool {
    let trimmed = response.trim();
    trimmed.starts_with('{')
        || trimmed.starts_with('[')
        || response.contains("```json")
        || (response.contains("\"date\":") && response.contains("\"stripes\":"))
}

/// Extract the JSON payload from a reply.
/// Handles ```json fences, bare ``` fences, and unfenced text.
pub fn extract_json_payload(response: &str) -> &str {
    // Try to find JSON in a ```json code fence
    if let Some(start) = response.find("```json") {
        let json_start = start + 7;
        return match response[json_start..].find("```") {
            Some(end) => response[json_start..json_start + end].trim(),
            None => response[json_start..].trim(),
        };
    }
    // Try generic ``` code fence
    if let Some(start) = response.find("```") {
        let after_fence = start + 3;
        if let Some(nl) = response[after_fence..].find('\n') {
            let json_start = after_fence + nl + 1;
            if let Some(end) = response[json_start..].find("```") {
                let candidate = response[json_start..json_start + end].trim();
                if candidate.starts_with('[') || candidate.starts_with('{') {
                    return candidate;
                }
            }
        }
    }
    response.trim()
}

/// Parse a JSON day list (fences tolerated) into interchange days.
pub fn parse_raw_schedule(response: &str) -> Result<Vec<RawScheduleDay>, CodecError> {
    let payload = extract_json_payload(response);
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| CodecError::RecoveryFailed(format!("invalid JSON: {}", e)))?;
    if !value.is_array() {
        let kind = match value {
            serde_json::Value::Object(_) => "an object",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::Bool(_) => "a boolean",
            _ => "null",
        };
        return Err(CodecError::RecoveryFailed(format!(
            "expected an array of days, got {}",
            kind
        )));
    }
    serde_json::from_value(value)
        .map_err(|e| CodecError::RecoveryFailed(format!("array is not a day list: {}", e)))
}

/// What the gate did with a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Reply was already text.
    PassThrough(String),
    /// Reply was JSON and has been rendered to text.
    Recovered { text: String, days: usize },
}

impl GateOutcome {
    pub fn text(&self) -> &str {
        match self {
            GateOutcome::PassThrough(text) => text,
            GateOutcome::Recovered { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            GateOutcome::PassThrough(text) => text,
            GateOutcome::Recovered { text, .. } => text,
        }
    }

    pub fn was_recovered(&self) -> bool {
        matches!(self, GateOutcome::Recovered { .. })
    }
}

/// Guard placed after every "text expected" service call.
#[derive(Debug, Clone, Default)]
pub struct RecoveryGate {
    options: EncodeOptions,
}

impl RecoveryGate {
    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }

    pub fn apply(&self, response: &str) -> Result<GateOutcome, CodecError> {
        if !looks_like_json(response) {
            return Ok(GateOutcome::PassThrough(response.to_string()));
        }

        log::warn!("Text response looks like JSON; attempting schedule recovery");
        let raw = parse_raw_schedule(response)?;
        let days = raw.len();
        let text = encode_raw_schedule(raw, &self.options)
            .map_err(|e| CodecError::RecoveryFailed(e.to_string()))?;
        log::info!("Recovered {} day(s) from JSON response", days);

        Ok(GateOutcome::Recovered { text, days })
    }
}
