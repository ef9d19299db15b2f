//! Input validation for the todo service
//!
//! Request payloads are checked here before they reach the compilers or the
//! concurrency guard: raw filter/sort JSON is bounded in size and shape, and
//! todo/assignment inputs are trimmed and length-checked.

use crate::constants::limits::{
    MAX_TODO_DESCRIPTION_LENGTH, MAX_TODO_NAME_LENGTH, MAX_USER_NAME_LENGTH,
};
use crate::error::{Result, TodoError};
use serde_json::Value;

/// Maximum serialized size of a filter or sort document (64KB)
const MAX_JSON_SIZE_BYTES: usize = 64 * 1024;

/// Maximum nesting depth of a raw filter or sort document
const MAX_JSON_DEPTH: usize = 32;

/// Maximum number of keys in one JSON object (or items in one array)
const MAX_JSON_KEYS: usize = 100;

/// Maximum string length for JSON keys and string values
const MAX_JSON_STRING_LENGTH: usize = 1000;

/// Validates a raw filter or sort document for size and structure
pub fn validate_query_input(value: &Value) -> Result<()> {
    let serialized = serde_json::to_string(value)
        .map_err(|e| TodoError::Validation(format!("Invalid JSON structure: {e}")))?;

    if serialized.len() > MAX_JSON_SIZE_BYTES {
        return Err(TodoError::Validation(format!(
            "JSON payload too large: {} bytes (max: {})",
            serialized.len(),
            MAX_JSON_SIZE_BYTES
        )));
    }

    validate_json_depth(value, 0)
}

fn validate_json_depth(value: &Value, current_depth: usize) -> Result<()> {
    if current_depth > MAX_JSON_DEPTH {
        return Err(TodoError::Validation(format!(
            "JSON nesting too deep: {current_depth} (max: {MAX_JSON_DEPTH})"
        )));
    }

    match value {
        Value::Object(map) => {
            if map.len() > MAX_JSON_KEYS {
                return Err(TodoError::Validation(format!(
                    "Too many JSON keys: {} (max: {})",
                    map.len(),
                    MAX_JSON_KEYS
                )));
            }

            for (key, val) in map {
                if key.chars().count() > MAX_JSON_STRING_LENGTH {
                    return Err(TodoError::Validation(format!(
                        "JSON key too long: {} chars (max: {})",
                        key.chars().count(),
                        MAX_JSON_STRING_LENGTH
                    )));
                }
                validate_json_depth(val, current_depth + 1)?;
            }
        }
        Value::Array(arr) => {
            if arr.len() > MAX_JSON_KEYS {
                return Err(TodoError::Validation(format!(
                    "JSON array too large: {} items (max: {})",
                    arr.len(),
                    MAX_JSON_KEYS
                )));
            }
            for item in arr {
                validate_json_depth(item, current_depth + 1)?;
            }
        }
        Value::String(s) => {
            if s.chars().count() > MAX_JSON_STRING_LENGTH {
                return Err(TodoError::Validation(format!(
                    "JSON string too long: {} chars (max: {})",
                    s.chars().count(),
                    MAX_JSON_STRING_LENGTH
                )));
            }
        }
        _ => {}
    }

    Ok(())
}

/// Trim `value` and check it is non-empty and at most `max_length` characters
fn required_text(field: &str, value: &str, max_length: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TodoError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max_length {
        return Err(TodoError::Validation(format!(
            "{field} must be at most {max_length} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validated todo name
pub fn validate_todo_name(name: &str) -> Result<String> {
    required_text("name", name, MAX_TODO_NAME_LENGTH)
}

/// Validated todo description; blank becomes `None`
pub fn validate_todo_description(description: Option<&str>) -> Result<Option<String>> {
    match description.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => required_text("description", text, MAX_TODO_DESCRIPTION_LENGTH).map(Some),
    }
}

pub fn validate_user_name(name: &str) -> Result<String> {
    required_text("name", name, MAX_USER_NAME_LENGTH)
}

/// Validated assignment owner, checked before the concurrency guard runs
pub fn validate_owner(owner: &str, max_length: usize) -> Result<String> {
    required_text("assignee", owner, max_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_query_input() {
        let filter = json!({
            "name": { "_contains": "Carlos" },
            "assignee": { "_or": { "email": { "_eq": "a@b.com" } } }
        });
        assert!(validate_query_input(&filter).is_ok());
    }

    #[test]
    fn test_query_input_too_deep() {
        let mut deep = json!({ "name": { "_eq": "x" } });
        for _ in 0..MAX_JSON_DEPTH {
            deep = json!({ "_and": deep });
        }
        assert!(matches!(
            validate_query_input(&deep),
            Err(TodoError::Validation(_))
        ));
    }

    #[test]
    fn test_query_string_too_long() {
        let long = "x".repeat(MAX_JSON_STRING_LENGTH + 1);
        assert!(validate_query_input(&json!({ "name": { "_eq": long } })).is_err());
    }

    #[test]
    fn test_todo_fields_are_trimmed_and_bounded() {
        assert_eq!(validate_todo_name("  Buy milk ").unwrap(), "Buy milk");
        assert!(validate_todo_name("   ").is_err());
        assert!(validate_todo_name(&"n".repeat(51)).is_err());

        assert_eq!(validate_todo_description(None).unwrap(), None);
        assert_eq!(validate_todo_description(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_todo_description(Some(" two liters ")).unwrap(),
            Some("two liters".to_string())
        );
        assert!(validate_todo_description(Some(&"d".repeat(101))).is_err());
    }

    #[test]
    fn test_owner_length_is_configurable() {
        assert_eq!(validate_owner(" a@b.com ", 100).unwrap(), "a@b.com");
        assert!(validate_owner("a@b.com", 3).is_err());
        assert!(validate_owner("", 100).is_err());
    }

    #[test]
    fn test_user_name_is_required() {
        assert_eq!(validate_user_name(" Carlos ").unwrap(), "Carlos");
        assert!(validate_user_name("").is_err());
    }
}
