use crate::types::{ParsedTask, PrioritizedTask, Priority, Task, TaskPayload};
use crate::util::normalize_optional;
use chrono::Local;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// The authoritative in-memory task collection, newest first. All mutation
/// goes through the methods below; callers persist the snapshot afterwards.
pub struct TaskStore {
    tasks: Vec<Task>,
}

pub struct StoreState(pub Arc<Mutex<TaskStore>>);

impl StoreState {
    pub(crate) fn locked(&self) -> Result<std::sync::MutexGuard<'_, TaskStore>, String> {
        self.0
            .lock()
            .map_err(|error| format!("Lock poisoned: {error}"))
    }
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn add(&mut self, task: Task) {
        self.tasks.insert(0, task);
    }

    pub fn toggle_completed(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    pub fn set_reminder(&mut self, id: &str, reminder: Option<String>) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.reminder = normalize_optional(reminder);
                true
            }
            None => false,
        }
    }

    pub fn set_priority(&mut self, id: &str, priority: Priority) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.priority = priority;
                true
            }
            None => false,
        }
    }

    /// Replaces the task's subtasks with fresh lightweight tasks built from
    /// the given titles: Unset priority, the parent's category, not completed.
    pub fn apply_breakdown(&mut self, id: &str, subtask_titles: &[String]) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                let category = task.category;
                task.subtasks = Some(
                    subtask_titles
                        .iter()
                        .map(|title| Task {
                            id: generate_task_id(),
                            title: title.clone(),
                            start_date: None,
                            end_date: None,
                            time: None,
                            reminder: None,
                            priority: Priority::Unset,
                            category,
                            completed: false,
                            subtasks: None,
                        })
                        .collect(),
                );
                true
            }
            None => false,
        }
    }

    /// Applies AI prioritization results by id. Entries referencing unknown
    /// ids are dropped; tasks absent from the result set keep their priority.
    pub fn apply_prioritization(&mut self, results: &[PrioritizedTask]) -> usize {
        let mut applied = 0;
        for result in results {
            if let Some(task) = self.tasks.iter_mut().find(|task| task.id == result.id) {
                task.priority = result.priority;
                applied += 1;
            }
        }
        applied
    }
}

pub(crate) fn generate_task_id() -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);
    let tick = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("task_{}_{}", Local::now().format("%Y%m%d_%H%M%S"), tick)
}

pub(crate) fn task_from_payload(payload: TaskPayload) -> Task {
    let title = payload.title.trim().to_string();
    Task {
        id: generate_task_id(),
        title: if title.is_empty() { "New task".to_string() } else { title },
        start_date: normalize_optional(payload.start_date),
        end_date: normalize_optional(payload.end_date),
        time: normalize_optional(payload.time),
        reminder: normalize_optional(payload.reminder),
        priority: payload.priority,
        category: payload.category,
        completed: false,
        subtasks: None,
    }
}

pub(crate) fn task_from_parsed(raw_input: &str, parsed: ParsedTask) -> Task {
    Task {
        id: generate_task_id(),
        title: parsed.title.unwrap_or_else(|| raw_input.to_string()),
        start_date: parsed.start_date,
        end_date: parsed.end_date,
        time: parsed.time,
        reminder: parsed.reminder,
        priority: parsed.priority,
        category: parsed.category,
        completed: false,
        subtasks: None,
    }
}

/// When free-text parsing fails the user still gets a task: raw input as the
/// title, everything else at defaults.
pub(crate) fn fallback_task(raw_input: &str) -> Task {
    task_from_parsed(raw_input, ParsedTask::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn sample_task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            start_date: None,
            end_date: None,
            time: None,
            reminder: None,
            priority: Priority::Unset,
            category: Category::Other,
            completed: false,
            subtasks: None,
        }
    }

    fn seeded_store() -> TaskStore {
        let mut store = TaskStore::new(Vec::new());
        store.add(sample_task("a", "Write report"));
        store.add(sample_task("b", "Pay rent"));
        store.add(sample_task("c", "Book dentist"));
        store
    }

    #[test]
    fn add_prepends_newest_first() {
        let store = seeded_store();
        let ids: Vec<&str> = store.tasks().iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..64 {
            assert!(seen.insert(generate_task_id()));
        }
    }

    #[test]
    fn mutations_are_no_ops_on_unknown_ids() {
        let mut store = seeded_store();
        assert!(!store.toggle_completed("zzz"));
        assert!(!store.delete("zzz"));
        assert!(!store.set_reminder("zzz", Some("08:00".to_string())));
        assert!(!store.set_priority("zzz", Priority::Critical));
        assert!(!store.apply_breakdown("zzz", &["step".to_string()]));
        assert_eq!(store.tasks().len(), 3);
    }

    #[test]
    fn set_reminder_normalizes_blank_to_absent() {
        let mut store = seeded_store();
        assert!(store.set_reminder("a", Some("07:30".to_string())));
        assert_eq!(store.get("a").unwrap().reminder.as_deref(), Some("07:30"));
        assert!(store.set_reminder("a", Some("   ".to_string())));
        assert_eq!(store.get("a").unwrap().reminder, None);
        assert!(store.set_reminder("a", None));
        assert_eq!(store.get("a").unwrap().reminder, None);
    }

    #[test]
    fn breakdown_replaces_prior_subtasks_and_inherits_category() {
        let mut store = TaskStore::new(Vec::new());
        let mut parent = sample_task("p", "Plan launch");
        parent.category = Category::Work;
        store.add(parent);

        assert!(store.apply_breakdown("p", &["draft brief".to_string(), "invite team".to_string()]));
        let first = store.get("p").unwrap().subtasks.clone().unwrap();
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|sub| sub.category == Category::Work));
        assert!(first.iter().all(|sub| sub.priority == Priority::Unset));
        assert!(first.iter().all(|sub| !sub.completed));

        assert!(store.apply_breakdown("p", &["single step".to_string()]));
        let second = store.get("p").unwrap().subtasks.clone().unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].title, "single step");
    }

    #[test]
    fn prioritization_subset_leaves_other_tasks_untouched_and_is_idempotent() {
        let mut store = seeded_store();
        store.set_priority("a", Priority::Important);

        let results = vec![PrioritizedTask {
            id: "b".to_string(),
            priority: Priority::Critical,
        }];
        assert_eq!(store.apply_prioritization(&results), 1);
        assert_eq!(store.get("a").unwrap().priority, Priority::Important);
        assert_eq!(store.get("b").unwrap().priority, Priority::Critical);
        assert_eq!(store.get("c").unwrap().priority, Priority::Unset);

        let once = store.snapshot();
        assert_eq!(store.apply_prioritization(&results), 1);
        assert_eq!(store.snapshot(), once);
    }

    #[test]
    fn prioritization_drops_unknown_ids() {
        let mut store = seeded_store();
        let results = vec![
            PrioritizedTask {
                id: "ghost".to_string(),
                priority: Priority::Critical,
            },
            PrioritizedTask {
                id: "a".to_string(),
                priority: Priority::CanWait,
            },
        ];
        assert_eq!(store.apply_prioritization(&results), 1);
        assert_eq!(store.get("a").unwrap().priority, Priority::CanWait);
    }

    #[test]
    fn fallback_task_carries_raw_input_and_defaults() {
        let task = fallback_task("buy milk tomorrow 8am");
        assert_eq!(task.title, "buy milk tomorrow 8am");
        assert_eq!(task.priority, Priority::Unset);
        assert_eq!(task.category, Category::Other);
        assert!(!task.completed);
        assert_eq!(task.reminder, None);
    }

    #[test]
    fn payload_normalization_trims_and_defaults() {
        let task = task_from_payload(TaskPayload {
            title: "  Review PR  ".to_string(),
            start_date: Some(" ".to_string()),
            end_date: Some("2025-06-10".to_string()),
            time: None,
            reminder: Some("".to_string()),
            priority: Priority::Important,
            category: Category::Work,
        });
        assert_eq!(task.title, "Review PR");
        assert_eq!(task.start_date, None);
        assert_eq!(task.end_date.as_deref(), Some("2025-06-10"));
        assert_eq!(task.reminder, None);
        assert_eq!(task.priority, Priority::Important);
    }
}
