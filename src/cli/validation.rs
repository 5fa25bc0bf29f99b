//! CLI argument validation functions
//!
//! This module provides custom validation functions for CLI arguments
//! that go beyond what clap can validate automatically.

use std::fs;
use std::path::PathBuf;

use serde_json::Value as JsonValue;

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("File does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!("Cannot read file '{}': {}", path_str, e)),
    }
}

/// Parse a `key=value` dispatch option.
///
/// The value is read as JSON when it parses (`true`, `3`, `{"foo": "x"}`),
/// otherwise it is kept as a plain string.
pub fn parse_option(option_str: &str) -> Result<(String, JsonValue), String> {
    let (key, value) = option_str
        .split_once('=')
        .ok_or_else(|| format!("Option must be in key=value form, got: '{}'", option_str))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Option key cannot be empty: '{}'", option_str));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| JsonValue::String(value.to_string()));

    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_validate_file_path() {
        let file = NamedTempFile::new().unwrap();
        assert!(validate_file_path(file.path().to_str().unwrap()).is_ok());

        let dir = TempDir::new().unwrap();
        assert!(validate_file_path(dir.path().to_str().unwrap())
            .unwrap_err()
            .contains("not a file"));

        assert!(validate_file_path("/nonexistent/message.json")
            .unwrap_err()
            .contains("does not exist"));
    }

    #[test]
    fn test_parse_option_values() {
        assert_eq!(
            parse_option("save-on-fail=true").unwrap(),
            ("save-on-fail".to_string(), json!(true))
        );
        assert_eq!(
            parse_option("mail-override=ops@example.com").unwrap(),
            ("mail-override".to_string(), json!("ops@example.com"))
        );
        assert_eq!(
            parse_option(r#"rendered-fields={"foo":"rendered_foo"}"#).unwrap().1,
            json!({"foo": "rendered_foo"})
        );
        assert_eq!(
            parse_option("webhook-url=https://hooks.example.com/a=b").unwrap().1,
            json!("https://hooks.example.com/a=b")
        );
        assert_eq!(parse_option("phone-number=").unwrap().1, json!(""));
    }

    #[test]
    fn test_parse_option_errors() {
        assert!(parse_option("no-separator").is_err());
        assert!(parse_option("=value").is_err());
    }
}
