//! Response-shape normalization.
//!
//! The backend is not consistent about envelopes: lists arrive under
//! different key names per endpoint (`consultations`, `rdv`, ...), error
//! bodies carry either a `message` string or an `errors` map, and some
//! failure paths return HTML instead of JSON. Everything shape-related is
//! resolved here so the typed layer above only ever sees canonical values.

use serde_json::Value;

use super::error::ApiError;

/// Classify a raw HTTP outcome into a parsed JSON body or an [`ApiError`].
///
/// Non-JSON bodies never panic: a 2xx HTML page classifies as an invalid
/// body, a non-2xx HTML page the same, and a non-2xx JSON body becomes
/// `RequestFailed` (or `AuthInvalid` for 401/403) carrying the backend's
/// own message when one exists.
pub fn classify(status: u16, body: &str) -> Result<Value, ApiError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if (200..300).contains(&status) {
        return parsed.ok_or_else(|| {
            tracing::warn!(status, "2xx response with a non-JSON body");
            ApiError::invalid_body()
        });
    }

    let message = parsed.as_ref().and_then(error_message);
    match status {
        401 | 403 => Err(ApiError::AuthInvalid {
            message: message
                .unwrap_or_else(|| "Session expirée, veuillez vous reconnecter.".into()),
        }),
        _ => match message {
            Some(message) => Err(ApiError::RequestFailed { status, message }),
            None if parsed.is_some() => Err(ApiError::request_failed(status)),
            None => {
                tracing::warn!(status, "non-2xx response with a non-JSON body");
                Err(ApiError::invalid_body())
            }
        },
    }
}

/// Extract the user-facing message from an error body.
///
/// Prefers the `message` field; falls back to flattening the Laravel-style
/// `errors` map (field -> [messages]) joined with "; ".
pub fn error_message(body: &Value) -> Option<String> {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        if !message.is_empty() {
            return Some(message.to_string());
        }
    }
    let errors = body.get("errors")?.as_object()?;
    let mut parts: Vec<String> = Vec::new();
    for value in errors.values() {
        match value {
            Value::Array(items) => {
                parts.extend(items.iter().filter_map(Value::as_str).map(String::from))
            }
            Value::String(s) => parts.push(s.clone()),
            _ => {}
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// Pull a list out of an envelope that may use any of `keys`, or be a bare
/// top-level array. Missing keys yield an empty list, matching the
/// `data.rdv || []` tolerance of the screens.
pub fn extract_list(body: &Value, keys: &[&str]) -> Vec<Value> {
    if let Some(items) = body.as_array() {
        return items.clone();
    }
    for key in keys {
        if let Some(items) = body.get(key).and_then(Value::as_array) {
            return items.clone();
        }
    }
    Vec::new()
}

/// Pull the object payload out of an envelope that may use any of `keys`,
/// or be the payload itself.
pub fn extract_object<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    for key in keys {
        if let Some(obj) = body.get(key) {
            if obj.is_object() {
                return Some(obj);
            }
        }
    }
    body.is_object().then_some(body)
}
