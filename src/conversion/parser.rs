//! Model reply parsing
//!
//! Replies are tried as raw JSON, then as a fenced code block, then as the
//! widest `{ ... }` span. The first candidate that is a JSON object wins.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

use super::models::StructuredResume;

static FENCED_BLOCK: OnceLock<Regex> = OnceLock::new();
static BRACE_SPAN: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("no JSON found in reply")]
    NoJson,

    #[error("reply JSON is not an object")]
    NotAnObject,

    #[error("reply does not match the resume schema: {0}")]
    Schema(String),
}

/// Locate the JSON object embedded in a model reply
pub fn extract_json_object(reply: &str) -> Result<Value, ParseError> {
    let fenced = FENCED_BLOCK
        .get_or_init(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("valid regex"));
    let braces = BRACE_SPAN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

    let trimmed = reply.trim();
    let candidates = [
        ("direct", Some(trimmed)),
        (
            "fenced",
            fenced
                .captures(trimmed)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str()),
        ),
        ("braces", braces.find(trimmed).map(|m| m.as_str())),
    ];

    let mut saw_json = false;
    for (strategy, candidate) in candidates {
        let Some(text) = candidate else { continue };
        match serde_json::from_str::<Value>(text) {
            Ok(value @ Value::Object(_)) => {
                debug!(strategy, "Extracted JSON object from model reply");
                return Ok(value);
            }
            Ok(_) => saw_json = true,
            Err(_) => {}
        }
    }

    if saw_json {
        Err(ParseError::NotAnObject)
    } else {
        Err(ParseError::NoJson)
    }
}

/// Extract and validate a resume from a model reply
pub fn parse_reply(reply: &str) -> Result<StructuredResume, ParseError> {
    let value = extract_json_object(reply)?;
    validate_resume(value)
}

/// Check a JSON object against the resume schema
pub fn validate_resume(value: Value) -> Result<StructuredResume, ParseError> {
    if !value.is_object() {
        return Err(ParseError::NotAnObject);
    }
    serde_json::from_value::<StructuredResume>(value)
        .map(StructuredResume::fill_nulls)
        .map_err(|e| ParseError::Schema(e.to_string()))
}
