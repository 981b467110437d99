//! Response coercion policies for live-data bodies.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, TimetableError};

/// Rejects an absent body (empty or JSON `null`).
///
/// # Errors
///
/// Returns an invalid-response error when `body` is `None`.
pub fn require_body(operation: &'static str, body: Option<Value>) -> Result<Value> {
    body.ok_or_else(|| TimetableError::invalid_response(operation, "no data in response body"))
}

/// Decodes a list body; any non-array JSON value becomes an empty list.
///
/// # Errors
///
/// Returns an invalid-response error when an array element does not
/// match `T`.
pub fn coerce_list<T: DeserializeOwned>(operation: &'static str, value: Value) -> Result<Vec<T>> {
    if !value.is_array() {
        tracing::warn!(
            operation,
            kind = json_kind(&value),
            "non-array response coerced to an empty list"
        );
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(|e| {
        TimetableError::invalid_response(operation, format!("unexpected list element: {e}"))
    })
}

/// Interprets a publication-status body as a boolean.
///
/// `true`/`false`, non-zero numbers, `"true"`/`"1"`, and an object's
/// `published` member count; everything else is `false`.
#[must_use]
pub fn coerce_published(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        Value::Object(map) => map.get("published").is_some_and(coerce_published),
        Value::Null | Value::Array(_) => false,
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
