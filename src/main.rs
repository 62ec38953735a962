#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod commands;
mod gateway;
mod providers;
mod reminders;
mod storage;
mod store;
mod types;
mod util;

use crate::store::{StoreState, TaskStore};
use crate::types::OpFlags;
use std::sync::{Arc, Mutex};

fn main() {
    let store = Arc::new(Mutex::new(TaskStore::new(storage::tasks_io::load_tasks())));
    let scheduler_store = store.clone();

    tauri::Builder::default()
        .plugin(tauri_plugin_notification::init())
        .manage(StoreState(store))
        .manage(OpFlags::default())
        .setup(move |app| {
            reminders::spawn_scheduler(app.handle().clone(), scheduler_store);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::tasks::list_tasks,
            commands::tasks::add_task,
            commands::tasks::add_task_from_text,
            commands::tasks::toggle_task,
            commands::tasks::delete_task,
            commands::tasks::set_task_reminder,
            commands::tasks::set_task_priority,
            commands::ai::prioritize_tasks,
            commands::ai::generate_daily_plan,
            commands::ai::generate_weekly_plan,
            commands::ai::breakdown_task,
            commands::ai::motivational_message,
            commands::ai::run_performance_analysis,
            commands::board::get_board_snapshot,
            commands::board::get_analytics_stats,
            commands::calendar::create_calendar_event,
            commands::calendar::build_calendar_auth_url,
            commands::calendar::exchange_calendar_auth_code,
            commands::keychain::set_gemini_api_key,
            commands::keychain::has_gemini_api_key,
            commands::keychain::clear_gemini_api_key,
            commands::keychain::set_calendar_token,
            commands::keychain::has_calendar_token,
            commands::keychain::clear_calendar_token,
            commands::settings::get_app_settings,
            commands::settings::save_app_settings,
            commands::notifications::get_notification_permission,
            commands::notifications::request_notification_permission,
            commands::health::get_health_diagnostics,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
