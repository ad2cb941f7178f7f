//! Masking of credentials before request data reaches the logs

use serde_json::{Map, Value as JsonValue};

const SENSITIVE_FIELDS: &[&str] = &[
    "sessionid",
    "session_id",
    "password",
    "token",
    "access_token",
    "authorization",
    "secret",
    "credential",
    "credentials",
];

const SENSITIVE_PATTERNS: &[&str] = &["password", "_token", "_secret", "session"];

pub const SANITIZED_PLACEHOLDER: &str = "***REDACTED***";

/// Check if a parameter or header name indicates sensitive data
pub fn is_sensitive_field(field_name: &str) -> bool {
    let field_lower = field_name.to_lowercase();

    if SENSITIVE_FIELDS.iter().any(|&sensitive| field_lower == sensitive) {
        return true;
    }

    SENSITIVE_PATTERNS
        .iter()
        .any(|&pattern| field_lower.contains(pattern))
}

/// Copy of `value` with every sensitive field replaced by the placeholder
pub fn sanitize_json_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let sanitized: Map<String, JsonValue> = map
                .iter()
                .map(|(key, val)| {
                    let val = match val {
                        JsonValue::Object(_) | JsonValue::Array(_) => sanitize_json_value(val),
                        _ if is_sensitive_field(key) => {
                            JsonValue::String(SANITIZED_PLACEHOLDER.to_string())
                        }
                        other => other.clone(),
                    };
                    (key.clone(), val)
                })
                .collect();
            JsonValue::Object(sanitized)
        }
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(sanitize_json_value).collect()),
        other => other.clone(),
    }
}

/// Render an `Authorization` header value for logging: keeps the scheme only
pub fn mask_authorization(value: &str) -> String {
    match value.split_once(' ') {
        Some((scheme, _)) => format!("{} {}", scheme, SANITIZED_PLACEHOLDER),
        None => SANITIZED_PLACEHOLDER.to_string(),
    }
}
