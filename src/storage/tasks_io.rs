use crate::types::{Task, SETTINGS_DIR_NAME, TASKS_FILE_NAME};
use crate::util::write_atomic;
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) fn tasks_store_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join(SETTINGS_DIR_NAME).join(TASKS_FILE_NAME)
}

/// Loads the whole collection; a missing or corrupt file means starting
/// empty, never an error.
pub(crate) fn load_tasks() -> Vec<Task> {
    load_tasks_from(&tasks_store_path())
}

pub(crate) fn load_tasks_from(path: &Path) -> Vec<Task> {
    if !path.exists() {
        return Vec::new();
    }

    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str::<Vec<Task>>(&content).unwrap_or_default(),
        Err(_) => Vec::new(),
    }
}

/// Full-collection write after every mutation; persistence is best-effort
/// from the caller's perspective.
pub(crate) fn save_tasks(tasks: &[Task]) -> Result<(), String> {
    save_tasks_to(&tasks_store_path(), tasks)
}

pub(crate) fn save_tasks_to(path: &Path, tasks: &[Task]) -> Result<(), String> {
    let bytes = serde_json::to_vec_pretty(tasks).map_err(|error| error.to_string())?;
    write_atomic(path, &bytes).map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Priority};
    use std::fs;

    fn collection() -> Vec<Task> {
        vec![
            Task {
                id: "task_20250601_080000_0".to_string(),
                title: "Study English".to_string(),
                start_date: Some("2025-06-01".to_string()),
                end_date: Some("2025-06-30".to_string()),
                time: Some("1h".to_string()),
                reminder: Some("07:00".to_string()),
                priority: Priority::Important,
                category: Category::Study,
                completed: false,
                subtasks: Some(vec![Task {
                    id: "task_20250601_080000_1".to_string(),
                    title: "Review vocabulary".to_string(),
                    start_date: None,
                    end_date: None,
                    time: None,
                    reminder: None,
                    priority: Priority::Unset,
                    category: Category::Study,
                    completed: false,
                    subtasks: None,
                }]),
            },
            Task {
                id: "task_20250601_090000_2".to_string(),
                title: "Pay rent".to_string(),
                start_date: None,
                end_date: None,
                time: None,
                reminder: Some("2025-06-05T09:00".to_string()),
                priority: Priority::Critical,
                category: Category::Finance,
                completed: true,
                subtasks: None,
            },
        ]
    }

    #[test]
    fn collection_round_trips_through_the_store_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tasks.json");

        let original = collection();
        save_tasks_to(&path, &original).expect("save tasks");
        let restored = load_tasks_from(&path);

        assert_eq!(restored, original);
    }

    #[test]
    fn missing_file_loads_as_empty_collection() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(load_tasks_from(&dir.path().join("absent.json")).is_empty());
    }

    #[test]
    fn corrupt_payload_loads_as_empty_collection() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tasks.json");
        fs::write(&path, b"{ this is not json ]").expect("write corrupt file");
        assert!(load_tasks_from(&path).is_empty());

        fs::write(&path, b"{\"wrong\":\"shape\"}").expect("write wrong shape");
        assert!(load_tasks_from(&path).is_empty());
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tasks.json");

        save_tasks_to(&path, &collection()).expect("first save");
        save_tasks_to(&path, &[]).expect("second save");
        assert!(load_tasks_from(&path).is_empty());
    }
}
