//! Config redaction: mask secrets before a config is printed or logged.

use serde_json::Value;

static SENSITIVE_KEYS: &[&str] = &[
    "token",
    "apiKey",
    "api_key",
    "accessToken",
    "access_token",
    "authorization",
    "secret",
    "password",
];

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

/// Replace every non-empty sensitive string with its first four characters
/// followed by `***` (or just `***` when shorter).
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => {
            let hint = if s.chars().count() > 4 {
                format!("{}***", s.chars().take(4).collect::<String>())
            } else {
                "***".to_string()
            };
            Value::String(hint)
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_token() {
        let redacted = redact(&json!({"token": "sk-abcdef123456", "model": "llama"}));
        assert_eq!(redacted["token"], "sk-a***");
        assert_eq!(redacted["model"], "llama");
    }

    #[test]
    fn short_and_empty_values() {
        let redacted = redact(&json!({"token": "abc", "password": ""}));
        assert_eq!(redacted["token"], "***");
        assert_eq!(redacted["password"], "");
    }

    #[test]
    fn nested_keys_match_case_insensitively() {
        let redacted = redact(&json!({"headers": {"Authorization": "Bearer xyz123"}}));
        assert_eq!(redacted["headers"]["Authorization"], "Bear***");
    }
}
