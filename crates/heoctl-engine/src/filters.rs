//! Template filters for Kubernetes manifests
//!
//! A small Helm-flavoured set: quoting, base64, indentation and serialisation.

use base64::Engine as _;
use minijinja::{Error, ErrorKind, Value};

fn invalid(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidOperation, message.into())
}

fn as_text(value: &Value) -> String {
    value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

/// `{{ name | quote }}`
pub fn quote(value: Value) -> String {
    let text = as_text(&value);
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// `{{ name | squote }}`
pub fn squote(value: Value) -> String {
    format!("'{}'", as_text(&value).replace('\'', "''"))
}

/// `{{ password | b64encode }}`
pub fn b64encode(value: Value) -> String {
    base64::engine::general_purpose::STANDARD.encode(as_text(&value))
}

/// `{{ encoded | b64decode }}`
pub fn b64decode(value: String) -> Result<String, Error> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(value.as_bytes())
        .map_err(|e| invalid(format!("base64 decode error: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| invalid(format!("UTF-8 decode error: {}", e)))
}

/// Prefix every non-empty line with `spaces` spaces
pub fn indent(value: String, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    value
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Like `indent`, with a leading newline
pub fn nindent(value: String, spaces: usize) -> String {
    format!("\n{}", indent(value, spaces))
}

/// `{{ labels | toyaml }}`
pub fn toyaml(value: Value) -> Result<String, Error> {
    let json: serde_json::Value =
        serde_json::to_value(&value).map_err(|e| invalid(e.to_string()))?;
    let yaml = serde_yaml::to_string(&json).map_err(|e| invalid(e.to_string()))?;

    Ok(yaml.trim_start_matches("---\n").trim_end().to_string())
}

/// `{{ config | tojson }}`
pub fn tojson(value: Value) -> Result<String, Error> {
    serde_json::to_string(&value).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        assert_eq!(quote(Value::from("web")), "\"web\"");
        assert_eq!(quote(Value::from("a\"b")), "\"a\\\"b\"");
        assert_eq!(quote(Value::from(3)), "\"3\"");
    }

    #[test]
    fn test_squote() {
        assert_eq!(squote(Value::from("it's")), "'it''s'");
    }

    #[test]
    fn test_base64_round_trip() {
        let encoded = b64encode(Value::from("s3cret"));
        assert_eq!(encoded, "czNjcmV0");
        assert_eq!(b64decode(encoded).unwrap(), "s3cret");
        assert!(b64decode("!!".to_string()).is_err());
    }

    #[test]
    fn test_indent_and_nindent() {
        assert_eq!(indent("a: 1\n\nb: 2".to_string(), 2), "  a: 1\n\n  b: 2");
        assert_eq!(nindent("a: 1".to_string(), 4), "\n    a: 1");
    }

    #[test]
    fn test_toyaml() {
        let value = Value::from_serialize(serde_json::json!({"app": "web"}));
        assert_eq!(toyaml(value).unwrap(), "app: web");
    }

    #[test]
    fn test_tojson() {
        let value = Value::from_serialize(serde_json::json!({"port": 80}));
        assert_eq!(tojson(value).unwrap(), r#"{"port":80}"#);
    }
}
