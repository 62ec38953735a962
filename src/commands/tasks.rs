use crate::gateway;
use crate::storage::settings_io::load_settings;
use crate::storage::tasks_io;
use crate::store::{fallback_task, task_from_parsed, task_from_payload, StoreState};
use crate::types::{OpFlags, Priority, Task, TaskPayload};
use tauri::State;

pub(crate) const OP_PARSE: &str = "parse";

#[tauri::command]
pub fn list_tasks(store: State<StoreState>) -> Result<Vec<Task>, String> {
    Ok(store.locked()?.snapshot())
}

/// Manual form path: no AI involved, blanks normalize to absent.
#[tauri::command]
pub fn add_task(store: State<StoreState>, payload: TaskPayload) -> Result<Task, String> {
    let task = task_from_payload(payload);
    let mut guard = store.locked()?;
    guard.add(task.clone());
    let _ = tasks_io::save_tasks(guard.tasks());
    Ok(task)
}

/// Free-text path: the sentence goes through the AI parser; when that fails
/// for any reason the raw input still becomes a task, never an error.
#[tauri::command]
pub async fn add_task_from_text(
    store: State<'_, StoreState>,
    flags: State<'_, OpFlags>,
    input: String,
) -> Result<Task, String> {
    let raw = input.trim().to_string();
    if raw.is_empty() {
        return Err("Task text cannot be empty".to_string());
    }

    flags.begin(OP_PARSE)?;
    let model = load_settings().default_model;
    let sentence = raw.clone();
    let parsed = tauri::async_runtime::spawn_blocking(move || {
        gateway::parse_task_from_input(&model, &sentence)
    })
    .await
    .map_err(|error| format!("AI worker join error: {error}"));
    flags.end(OP_PARSE);

    let task = match parsed {
        Ok(Ok(parsed)) => task_from_parsed(&raw, parsed),
        _ => fallback_task(&raw),
    };

    let mut guard = store.locked()?;
    guard.add(task.clone());
    let _ = tasks_io::save_tasks(guard.tasks());
    Ok(task)
}

#[tauri::command]
pub fn toggle_task(store: State<StoreState>, id: String) -> Result<(), String> {
    let mut guard = store.locked()?;
    if guard.toggle_completed(&id) {
        let _ = tasks_io::save_tasks(guard.tasks());
    }
    Ok(())
}

#[tauri::command]
pub fn delete_task(store: State<StoreState>, id: String) -> Result<(), String> {
    let mut guard = store.locked()?;
    if guard.delete(&id) {
        let _ = tasks_io::save_tasks(guard.tasks());
    }
    Ok(())
}

#[tauri::command]
pub fn set_task_reminder(
    store: State<StoreState>,
    id: String,
    reminder: Option<String>,
) -> Result<(), String> {
    let mut guard = store.locked()?;
    if guard.set_reminder(&id, reminder) {
        let _ = tasks_io::save_tasks(guard.tasks());
    }
    Ok(())
}

/// Drag-and-drop onto a bucket lands here.
#[tauri::command]
pub fn set_task_priority(
    store: State<StoreState>,
    id: String,
    priority: Priority,
) -> Result<(), String> {
    let mut guard = store.locked()?;
    if guard.set_priority(&id, priority) {
        let _ = tasks_io::save_tasks(guard.tasks());
    }
    Ok(())
}
