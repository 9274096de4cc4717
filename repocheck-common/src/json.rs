//! Helpers for inspecting loosely-typed manifest JSON.

use serde_json::{Map, Value};

/// Falsy values are `null`, `false`, `0` and `""`; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A field counts as present unless it is absent, `null` or an empty string.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Look up a present field.
pub fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| is_present(Some(v)))
}

/// Text form used for byte-for-byte comparisons: strings as-is, everything
/// else as compact JSON.
pub fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse a document that must be a JSON object.
pub fn parse_object(body: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, found {}", kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

/// JSON type name for messages.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
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
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(1), json!("false"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }

    #[test]
    fn test_presence() {
        assert!(!is_present(None));
        assert!(!is_present(Some(&json!(null))));
        assert!(!is_present(Some(&json!(""))));
        assert!(is_present(Some(&json!({}))));
        assert!(is_present(Some(&json!(false))));
    }

    #[test]
    fn test_text_keeps_strings_verbatim() {
        assert_eq!(text(&json!("1.0.0")), "1.0.0");
        assert_eq!(text(&json!(1)), "1");
        assert_eq!(text(&json!({"type": "MIT"})), r#"{"type":"MIT"}"#);
    }

    #[test]
    fn test_parse_object() {
        assert!(parse_object(r#"{"name": "x"}"#).is_ok());
        assert_eq!(
            parse_object("[1, 2]").unwrap_err(),
            "expected a JSON object, found array"
        );
        let err = parse_object("{ name: ").unwrap_err();
        assert!(err.contains("line 1"), "parser message should carry position: {err}");
    }
}
