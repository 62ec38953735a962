use crate::commands::keychain::{has_calendar_token_internal, has_gemini_api_key_internal};
use crate::storage::{settings_io, tasks_io};
use crate::store::StoreState;
use crate::types::HealthDiagnostics;
use tauri::State;

#[tauri::command]
pub fn get_health_diagnostics(store: State<StoreState>) -> Result<HealthDiagnostics, String> {
    let guard = store.locked()?;
    let tasks = guard.tasks();

    Ok(HealthDiagnostics {
        store_path: tasks_io::tasks_store_path().to_string_lossy().to_string(),
        settings_path: settings_io::app_settings_path()
            .to_string_lossy()
            .to_string(),
        tasks_count: tasks.len(),
        completed_count: tasks.iter().filter(|task| task.completed).count(),
        reminders_count: tasks.iter().filter(|task| task.reminder.is_some()).count(),
        latest_task_id: tasks.first().map(|task| task.id.clone()).unwrap_or_default(),
        has_gemini_api_key: has_gemini_api_key_internal().unwrap_or(false),
        has_calendar_token: has_calendar_token_internal().unwrap_or(false),
    })
}
