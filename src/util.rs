use chrono::NaiveDate;
use serde_json::Value;
use std::fs;
use std::path::Path;

pub(crate) fn option_non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(option_non_empty)
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Scalar-to-text coercion for provider payloads: strings pass through,
/// numbers are stringified, everything else counts as absent.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => option_non_empty(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

pub(crate) fn value_text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(scalar_text)
}

pub(crate) fn value_string_array(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(scalar_text).collect::<Vec<_>>())
        .unwrap_or_default()
}

/// Keeps only well-formed `YYYY-MM-DD` values.
pub(crate) fn sanitize_date(value: Option<String>) -> Option<String> {
    value
        .map(|item| item.trim().to_string())
        .filter(|item| item.len() == 10)
        .filter(|item| NaiveDate::parse_from_str(item, "%Y-%m-%d").is_ok())
}

/// Models frequently wrap structured output in markdown fences despite the
/// JSON mime type; strip them before parsing.
pub(crate) fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_text_coerces_numbers_and_drops_objects() {
        let payload = json!({
            "title": "Pay rent",
            "count": 3,
            "weird": { "nested": true },
            "blank": "   "
        });
        assert_eq!(value_text(&payload, "title"), Some("Pay rent".to_string()));
        assert_eq!(value_text(&payload, "count"), Some("3".to_string()));
        assert_eq!(value_text(&payload, "weird"), None);
        assert_eq!(value_text(&payload, "blank"), None);
        assert_eq!(value_text(&payload, "missing"), None);
    }

    #[test]
    fn string_arrays_drop_empty_and_non_text_entries() {
        let payload = json!({ "steps": ["draft outline", "", "  ", 15, null, ["x"]] });
        assert_eq!(
            value_string_array(&payload, "steps"),
            vec!["draft outline".to_string(), "15".to_string()]
        );
        assert!(value_string_array(&payload, "missing").is_empty());
    }

    #[test]
    fn date_sanitizer_rejects_malformed_values() {
        assert_eq!(
            sanitize_date(Some("2025-06-01".to_string())),
            Some("2025-06-01".to_string())
        );
        assert_eq!(sanitize_date(Some("2025-13-01".to_string())), None);
        assert_eq!(sanitize_date(Some("next week".to_string())), None);
        assert_eq!(sanitize_date(None), None);
    }

    #[test]
    fn code_fences_are_stripped() {
        let fenced = "```json\n{\"title\":\"x\"}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"title\":\"x\"}");
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }
}
