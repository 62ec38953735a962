use crate::gateway;
use crate::storage::settings_io::load_settings;
use crate::storage::tasks_io;
use crate::store::StoreState;
use crate::types::{DailyPlanItem, OpFlags, PerformanceAnalysis, Task, WeeklyPlanDay};
use tauri::State;

pub(crate) const OP_PRIORITIZE: &str = "prioritize";
pub(crate) const OP_DAILY_PLAN: &str = "daily-plan";
pub(crate) const OP_WEEKLY_PLAN: &str = "weekly-plan";
pub(crate) const OP_BREAKDOWN: &str = "breakdown";

/// Asks the model to rank every task, then applies the results by id against
/// the live store, so edits made while the call was in flight survive.
#[tauri::command]
pub async fn prioritize_tasks(
    store: State<'_, StoreState>,
    flags: State<'_, OpFlags>,
) -> Result<Vec<Task>, String> {
    let snapshot = store.locked()?.snapshot();
    if snapshot.is_empty() {
        return Ok(Vec::new());
    }

    flags.begin(OP_PRIORITIZE)?;
    let model = load_settings().default_model;
    let result = tauri::async_runtime::spawn_blocking(move || {
        gateway::prioritize_tasks(&model, &snapshot)
    })
    .await
    .map_err(|error| format!("AI worker join error: {error}"));
    flags.end(OP_PRIORITIZE);

    let results = result??;
    let mut guard = store.locked()?;
    guard.apply_prioritization(&results);
    let _ = tasks_io::save_tasks(guard.tasks());
    Ok(guard.snapshot())
}

#[tauri::command]
pub async fn generate_daily_plan(
    store: State<'_, StoreState>,
    flags: State<'_, OpFlags>,
) -> Result<Vec<DailyPlanItem>, String> {
    let open: Vec<Task> = store
        .locked()?
        .snapshot()
        .into_iter()
        .filter(|task| !task.completed)
        .collect();
    if open.is_empty() {
        return Err("There are no open tasks to plan".to_string());
    }

    flags.begin(OP_DAILY_PLAN)?;
    let model = load_settings().default_model;
    let result = tauri::async_runtime::spawn_blocking(move || {
        gateway::generate_daily_plan(&model, &open)
    })
    .await
    .map_err(|error| format!("AI worker join error: {error}"));
    flags.end(OP_DAILY_PLAN);

    result?
}

#[tauri::command]
pub async fn generate_weekly_plan(
    store: State<'_, StoreState>,
    flags: State<'_, OpFlags>,
) -> Result<Vec<WeeklyPlanDay>, String> {
    let open: Vec<Task> = store
        .locked()?
        .snapshot()
        .into_iter()
        .filter(|task| !task.completed)
        .collect();
    if open.is_empty() {
        return Err("There are no open tasks to plan".to_string());
    }

    flags.begin(OP_WEEKLY_PLAN)?;
    let model = load_settings().default_model;
    let result = tauri::async_runtime::spawn_blocking(move || {
        gateway::generate_weekly_plan(&model, &open)
    })
    .await
    .map_err(|error| format!("AI worker join error: {error}"));
    flags.end(OP_WEEKLY_PLAN);

    result?
}

/// Splits the task into subtask steps and stores them on the task,
/// replacing any previous breakdown.
#[tauri::command]
pub async fn breakdown_task(
    store: State<'_, StoreState>,
    flags: State<'_, OpFlags>,
    id: String,
) -> Result<Task, String> {
    let title = store
        .locked()?
        .get(&id)
        .map(|task| task.title.clone())
        .ok_or_else(|| format!("Unknown task id: {id}"))?;

    flags.begin(OP_BREAKDOWN)?;
    let model = load_settings().default_model;
    let result = tauri::async_runtime::spawn_blocking(move || {
        gateway::break_down_task(&model, &title)
    })
    .await
    .map_err(|error| format!("AI worker join error: {error}"));
    flags.end(OP_BREAKDOWN);

    let steps = result??;
    let mut guard = store.locked()?;
    if !guard.apply_breakdown(&id, &steps) {
        return Err(format!("Unknown task id: {id}"));
    }
    let _ = tasks_io::save_tasks(guard.tasks());
    guard
        .get(&id)
        .cloned()
        .ok_or_else(|| format!("Unknown task id: {id}"))
}

#[tauri::command]
pub async fn motivational_message(
    store: State<'_, StoreState>,
    id: String,
) -> Result<String, String> {
    let task = store
        .locked()?
        .get(&id)
        .cloned()
        .ok_or_else(|| format!("Unknown task id: {id}"))?;

    let model = load_settings().default_model;
    tauri::async_runtime::spawn_blocking(move || gateway::motivational_message(&model, &task))
        .await
        .map_err(|error| format!("AI worker join error: {error}"))?
}

/// Narrative review over completed vs. open titles; needs a few tasks of
/// history before it says anything useful.
#[tauri::command]
pub async fn run_performance_analysis(
    store: State<'_, StoreState>,
) -> Result<PerformanceAnalysis, String> {
    let snapshot = store.locked()?.snapshot();
    if snapshot.len() < 3 {
        return Err("Add at least 3 tasks to unlock the analysis".to_string());
    }

    let (completed, open): (Vec<Task>, Vec<Task>) =
        snapshot.into_iter().partition(|task| task.completed);
    let model = load_settings().default_model;
    tauri::async_runtime::spawn_blocking(move || {
        gateway::analyze_performance(&model, &completed, &open)
    })
    .await
    .map_err(|error| format!("AI worker join error: {error}"))?
}
