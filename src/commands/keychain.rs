use crate::providers::calendar::calendar_keyring_entry;
use crate::providers::gemini::gemini_keyring_entry;
use keyring::Error as KeyringError;

#[tauri::command]
pub fn set_gemini_api_key(api_key: String) -> Result<bool, String> {
    if api_key.trim().is_empty() {
        return Err("API key cannot be empty".to_string());
    }

    let entry = gemini_keyring_entry()?;
    entry
        .set_password(api_key.trim())
        .map_err(|error| error.to_string())?;
    Ok(true)
}

#[tauri::command]
pub fn has_gemini_api_key() -> Result<bool, String> {
    has_gemini_api_key_internal()
}

#[tauri::command]
pub fn clear_gemini_api_key() -> Result<bool, String> {
    let entry = gemini_keyring_entry()?;
    match entry.delete_password() {
        Ok(_) => Ok(true),
        Err(KeyringError::NoEntry) => Ok(true),
        Err(error) => Err(error.to_string()),
    }
}

#[tauri::command]
pub fn set_calendar_token(token: String) -> Result<bool, String> {
    if token.trim().is_empty() {
        return Err("Access token cannot be empty".to_string());
    }

    let entry = calendar_keyring_entry()?;
    entry
        .set_password(token.trim())
        .map_err(|error| error.to_string())?;
    Ok(true)
}

#[tauri::command]
pub fn has_calendar_token() -> Result<bool, String> {
    has_calendar_token_internal()
}

#[tauri::command]
pub fn clear_calendar_token() -> Result<bool, String> {
    let entry = calendar_keyring_entry()?;
    match entry.delete_password() {
        Ok(_) => Ok(true),
        Err(KeyringError::NoEntry) => Ok(true),
        Err(error) => Err(error.to_string()),
    }
}

pub(crate) fn has_gemini_api_key_internal() -> Result<bool, String> {
    let entry = gemini_keyring_entry()?;
    match entry.get_password() {
        Ok(value) => Ok(!value.trim().is_empty()),
        Err(KeyringError::NoEntry) => Ok(false),
        Err(error) => Err(error.to_string()),
    }
}

pub(crate) fn has_calendar_token_internal() -> Result<bool, String> {
    let entry = calendar_keyring_entry()?;
    match entry.get_password() {
        Ok(value) => Ok(!value.trim().is_empty()),
        Err(KeyringError::NoEntry) => Ok(false),
        Err(error) => Err(error.to_string()),
    }
}
