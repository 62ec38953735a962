use tauri::AppHandle;
use tauri_plugin_notification::{NotificationExt, PermissionState};

#[tauri::command]
pub fn get_notification_permission(app: AppHandle) -> Result<String, String> {
    let state = app
        .notification()
        .permission_state()
        .map_err(|error| error.to_string())?;
    Ok(permission_label(state).to_string())
}

#[tauri::command]
pub fn request_notification_permission(app: AppHandle) -> Result<String, String> {
    let state = app
        .notification()
        .request_permission()
        .map_err(|error| error.to_string())?;
    Ok(permission_label(state).to_string())
}

fn permission_label(state: PermissionState) -> &'static str {
    match state {
        PermissionState::Granted => "granted",
        PermissionState::Denied => "denied",
        _ => "default",
    }
}
