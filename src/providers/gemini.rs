use crate::types::{AI_TIMEOUT_SECS, GEMINI_API_BASE_URL, GEMINI_USERNAME, KEYRING_SERVICE};
use crate::util::strip_code_fences;
use keyring::{Entry, Error as KeyringError};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration as StdDuration;

pub(crate) fn gemini_keyring_entry() -> Result<Entry, String> {
    Entry::new(KEYRING_SERVICE, GEMINI_USERNAME).map_err(|error| error.to_string())
}

pub(crate) fn resolve_gemini_api_key(api_key: Option<String>) -> Result<String, String> {
    if let Some(provided) = api_key {
        if !provided.trim().is_empty() {
            return Ok(provided.trim().to_string());
        }
    }

    let entry = gemini_keyring_entry()?;
    match entry.get_password() {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Ok(_) => Err("Missing Gemini API key. Set it in Settings first.".to_string()),
        Err(KeyringError::NoEntry) => {
            Err("Missing Gemini API key. Set it in Settings first.".to_string())
        }
        Err(error) => Err(error.to_string()),
    }
}

/// One structured-output call: prompt in, schema-constrained JSON out.
pub(crate) fn generate_structured(
    model: &str,
    prompt: &str,
    response_schema: Value,
) -> Result<Value, String> {
    let payload = json!({
        "contents": [{
            "parts": [{
                "text": prompt
            }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema
        }
    });

    let body = post_generate_content(model, &payload)?;
    let text = extract_candidate_text(&body);
    if text.trim().is_empty() {
        return Err("Gemini response is empty".to_string());
    }

    serde_json::from_str(&strip_code_fences(&text)).map_err(|error| error.to_string())
}

/// Plain text generation, for operations with no output schema.
pub(crate) fn generate_text(model: &str, prompt: &str) -> Result<String, String> {
    let payload = json!({
        "contents": [{
            "parts": [{
                "text": prompt
            }]
        }]
    });

    let body = post_generate_content(model, &payload)?;
    let text = extract_candidate_text(&body);
    if text.trim().is_empty() {
        return Err("Gemini response is empty".to_string());
    }
    Ok(text.trim().to_string())
}

fn post_generate_content(model: &str, payload: &Value) -> Result<Value, String> {
    let api_key = resolve_gemini_api_key(None)?;
    let url = format!("{GEMINI_API_BASE_URL}/{model}:generateContent?key={api_key}");

    let client = Client::builder()
        .timeout(StdDuration::from_secs(AI_TIMEOUT_SECS))
        .build()
        .map_err(|error| error.to_string())?;

    let response = client
        .post(url)
        .json(payload)
        .send()
        .map_err(|error| error.to_string())?;

    let status = response.status();
    let body = response.text().map_err(|error| error.to_string())?;
    if !status.is_success() {
        return Err(format!("Gemini API {}: {body}", status.as_u16()));
    }

    serde_json::from_str(&body).map_err(|error| error.to_string())
}

pub(crate) fn extract_candidate_text(value: &Value) -> String {
    value
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|item| item.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_text_joins_all_parts() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "first" },
                        { "inlineData": { "data": "ignored" } },
                        { "text": "second" }
                    ]
                }
            }]
        });
        assert_eq!(extract_candidate_text(&body), "first\nsecond");
    }

    #[test]
    fn candidate_text_is_empty_for_unexpected_shapes() {
        assert_eq!(extract_candidate_text(&json!({})), "");
        assert_eq!(extract_candidate_text(&json!({ "candidates": [] })), "");
        assert_eq!(
            extract_candidate_text(&json!({ "candidates": [{ "content": {} }] })),
            ""
        );
    }
}
