//! Response parsing helpers
//!
//! Models routinely wrap JSON answers in Markdown code fences; parsers here
//! strip those before handing the body to serde. A reply that still is not
//! a JSON object is a terminal parse failure for that agent (never retried).

use thiserror::Error;

/// Agent response parse failure
#[derive(Debug, Clone, Error)]
#[error("invalid JSON from agent: {0}")]
pub struct ParseError(pub String);

/// Strip a surrounding Markdown code fence, if any
#[must_use]
pub fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", ...) up to the first newline
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => return trimmed,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Default parser: the reply must be a JSON object
pub fn parse_object(raw: &str) -> Result<serde_json::Value, ParseError> {
    let body = extract_json(raw);
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ParseError(e.to_string()))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ParseError(format!(
            "expected a JSON object, got {}",
            json_type_name(&value)
        )))
    }
}

/// Documentation parser: JSON object, or wrap plain prose
///
/// The documentation agent is asked for `{"documentation": <markdown>}` but
/// frequently answers with the markdown alone; that is still a usable
/// result, so it is wrapped instead of failed.
pub fn parse_document(raw: &str) -> Result<serde_json::Value, ParseError> {
    match parse_object(raw) {
        Ok(value) => Ok(value),
        Err(_) if !raw.trim().is_empty() => Ok(serde_json::json!({
            "documentation": raw.trim(),
        })),
        Err(e) => Err(e),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
