//! Tolerant JSON extraction for combined-mode responses.
//!
//! Generation backends routinely wrap the requested JSON object in
//! prose or markdown fences. The extractor strips fences, then scans
//! from the first `{` to the last `}` and attempts a parse; anything
//! less than a valid object is a format error.

use serde::Deserialize;

use crate::error::{GenerationError, GenerationResult};

/// Both channel outputs from one combined-mode call.
#[derive(Debug, Clone, Deserialize)]
pub struct CombinedPayload {
    pub telegram: String,
    pub website: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Pull the embedded JSON object out of a possibly prose-wrapped
/// response.
pub fn extract_json(raw: &str) -> GenerationResult<serde_json::Value> {
    let stripped = strip_code_fences(raw);

    let start = stripped
        .find('{')
        .ok_or_else(|| GenerationError::Format("no JSON object in response".into()))?;
    let end = stripped
        .rfind('}')
        .ok_or_else(|| GenerationError::Format("unterminated JSON object in response".into()))?;
    if end < start {
        return Err(GenerationError::Format(
            "malformed JSON object in response".into(),
        ));
    }

    serde_json::from_str(&stripped[start..=end])
        .map_err(|e| GenerationError::Format(format!("JSON parse failed: {}", e)))
}

/// Parse a combined-mode response into both channel bodies.
pub fn parse_combined(raw: &str) -> GenerationResult<CombinedPayload> {
    let value = extract_json(raw)?;
    serde_json::from_value(value)
        .map_err(|e| GenerationError::Format(format!("unexpected combined payload shape: {}", e)))
}

fn strip_code_fences(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}
