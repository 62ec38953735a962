use crate::providers::calendar;
use crate::storage::settings_io::load_settings;
use crate::store::StoreState;
use crate::types::CalendarEventResult;
use tauri::State;

/// One-way export of a task as a calendar event. Best-effort: failures are
/// reported to the caller and never touch the task store.
#[tauri::command]
pub async fn create_calendar_event(
    store: State<'_, StoreState>,
    id: String,
) -> Result<CalendarEventResult, String> {
    let task = store
        .locked()?
        .get(&id)
        .cloned()
        .ok_or_else(|| format!("Unknown task id: {id}"))?;

    let calendar_id = load_settings().integrations.calendar.calendar_id;
    let token = calendar::resolve_calendar_token(None)?;
    tauri::async_runtime::spawn_blocking(move || {
        calendar::create_event(&task, &calendar_id, &token)
    })
    .await
    .map_err(|error| format!("Calendar worker join error: {error}"))?
}

#[tauri::command]
pub fn build_calendar_auth_url(redirect_uri: String) -> Result<String, String> {
    let client_id = load_settings().integrations.calendar.client_id;
    calendar::build_auth_url(&client_id, &redirect_uri)
}

/// Finishes the OAuth handshake: trades the authorization code for an
/// access token and stores it in the keyring.
#[tauri::command]
pub async fn exchange_calendar_auth_code(
    client_secret: String,
    code: String,
    redirect_uri: String,
) -> Result<bool, String> {
    let client_id = load_settings().integrations.calendar.client_id;
    if client_id.is_empty() {
        return Err("Calendar client id is not configured. Set it in Settings first.".to_string());
    }

    let token = tauri::async_runtime::spawn_blocking(move || {
        calendar::exchange_auth_code(&client_id, &client_secret, &code, &redirect_uri)
    })
    .await
    .map_err(|error| format!("Calendar worker join error: {error}"))??;

    let entry = calendar::calendar_keyring_entry()?;
    entry
        .set_password(token.trim())
        .map_err(|error| error.to_string())?;
    Ok(true)
}
