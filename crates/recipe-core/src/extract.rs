//! Defensive JSON extraction from model responses.
//!
//! Sessions are asked for JSON but routinely wrap it in markdown fences or
//! explanatory prose. Extraction tries, in order: direct parse, fenced code
//! blocks, then the first balanced object/array embedded in the text. All
//! failures surface as [`RecipeError::Extract`] with a response preview so
//! the operator can see what came back.

use crate::error::{RecipeError, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

static FENCE_RE: OnceLock<Regex> = OnceLock::new();

fn fence_re() -> &'static Regex {
    // ```json ... ``` or bare ``` ... ```
    FENCE_RE.get_or_init(|| Regex::new(r"(?si)```(?:json)?\s*\n?(.*?)```").unwrap())
}

/// Extract a JSON value (object or array) from a model response.
pub fn extract_json(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RecipeError::Extract("empty response".into()));
    }

    // Direct parse
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        if v.is_object() || v.is_array() {
            return Ok(v);
        }
    }

    // Fenced code blocks
    for cap in fence_re().captures_iter(trimmed) {
        if let Ok(v) = serde_json::from_str::<Value>(cap[1].trim()) {
            if v.is_object() || v.is_array() {
                return Ok(v);
            }
        }
    }

    // First balanced {...} or [...] embedded in surrounding prose
    if let Some(v) = scan_balanced(trimmed) {
        return Ok(v);
    }

    Err(RecipeError::Extract(format!(
        "no valid JSON found; response preview: {}",
        preview(trimmed)
    )))
}

/// Extract a JSON object, rejecting arrays and scalars.
pub fn extract_object(text: &str) -> Result<Map<String, Value>> {
    match extract_json(text)? {
        Value::Object(map) => Ok(map),
        other => Err(RecipeError::Extract(format!(
            "expected JSON object, got {}",
            kind(&other)
        ))),
    }
}

/// Extract a JSON array, rejecting objects and scalars.
pub fn extract_array(text: &str) -> Result<Vec<Value>> {
    match extract_json(text)? {
        Value::Array(items) => Ok(items),
        other => Err(RecipeError::Extract(format!(
            "expected JSON array, got {}",
            kind(&other)
        ))),
    }
}

/// Scan for the first balanced `{...}` or `[...]` that parses as JSON.
/// Tracks string/escape state so braces inside string literals don't count.
fn scan_balanced(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    for (start, &b) in bytes.iter().enumerate() {
        let (open, close) = match b {
            b'{' => (b'{', b'}'),
            b'[' => (b'[', b']'),
            _ => continue,
        };

        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (offset, &c) in bytes[start..].iter().enumerate() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                b'\\' if in_string => escaped = true,
                b'"' => in_string = !in_string,
                _ if in_string => {}
                _ if c == open => depth += 1,
                _ if c == close => {
                    depth -= 1;
                    if depth == 0 {
                        let candidate = &text[start..start + offset + 1];
                        if let Ok(v) = serde_json::from_str::<Value>(candidate) {
                            return Some(v);
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
    }
    None
}

fn preview(text: &str) -> String {
    let mut p: String = text.chars().take(300).collect();
    if text.chars().count() > 300 {
        p.push('…');
    }
    p
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direct_object() {
        let v = extract_json(r#"{"score": 0.8}"#).unwrap();
        assert_eq!(v, json!({"score": 0.8}));
    }

    #[test]
    fn direct_array() {
        let v = extract_json(r#"[1, 2, 3]"#).unwrap();
        assert_eq!(v, json!([1, 2, 3]));
    }

    #[test]
    fn json_fence() {
        let text = "Here is the analysis:\n```json\n{\"structure\": \"linear\"}\n```\nHope that helps!";
        let v = extract_json(text).unwrap();
        assert_eq!(v, json!({"structure": "linear"}));
    }

    #[test]
    fn bare_fence() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json(text).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn embedded_in_prose() {
        let text = "Sure! The result is {\"quality_score\": 0.7, \"recommendations\": [\"x\"]} as requested.";
        let v = extract_json(text).unwrap();
        assert_eq!(v["quality_score"], json!(0.7));
    }

    #[test]
    fn nested_object_with_braces_in_strings() {
        let text = r#"Output: {"note": "uses {braces} inside", "inner": {"k": 1}}"#;
        let v = extract_json(text).unwrap();
        assert_eq!(v["inner"]["k"], json!(1));
    }

    #[test]
    fn preamble_before_object() {
        let text = "I'll analyze this now.\nHere's what I found:\n{\"issues\": []}";
        assert_eq!(extract_json(text).unwrap(), json!({"issues": []}));
    }

    #[test]
    fn no_json_is_extract_error() {
        let err = extract_json("There is no JSON here at all.");
        assert!(matches!(err, Err(RecipeError::Extract(_))));
    }

    #[test]
    fn empty_response_is_extract_error() {
        assert!(matches!(
            extract_json("   "),
            Err(RecipeError::Extract(_))
        ));
    }

    #[test]
    fn object_wrapper_rejects_array() {
        let err = extract_object("[1, 2]");
        let msg = err.unwrap_err().to_string();
        assert!(msg.contains("expected JSON object"));
    }

    #[test]
    fn array_wrapper_rejects_object() {
        let err = extract_array(r#"{"a": 1}"#);
        let msg = err.unwrap_err().to_string();
        assert!(msg.contains("expected JSON array"));
    }

    #[test]
    fn array_wrapper_accepts_fenced_array() {
        let items = extract_array("```json\n[\"a\", \"b\"]\n```").unwrap();
        assert_eq!(items.len(), 2);
    }
}
