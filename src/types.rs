use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Mutex;

pub(crate) const KEYRING_SERVICE: &str = "com.focusdeck.desktop";
pub(crate) const GEMINI_USERNAME: &str = "gemini_api_key";
pub(crate) const CALENDAR_TOKEN_USERNAME: &str = "calendar_access_token";
pub(crate) const GEMINI_API_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models";
pub(crate) const CALENDAR_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3/calendars";
pub(crate) const CALENDAR_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub(crate) const CALENDAR_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub(crate) const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";
pub(crate) const SETTINGS_DIR_NAME: &str = "focusdeck-desktop";
pub(crate) const SETTINGS_FILE_NAME: &str = "settings.json";
pub(crate) const TASKS_FILE_NAME: &str = "tasks.json";
pub(crate) const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub(crate) const AI_TIMEOUT_SECS: u64 = 50;
pub(crate) const TOAST_DISMISS_MS: u64 = 5000;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    Unset,
    Critical,
    Important,
    CanWait,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Unset
    }
}

impl Priority {
    pub(crate) fn all() -> [Self; 4] {
        [Self::Unset, Self::Critical, Self::Important, Self::CanWait]
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Unset => "Unset",
            Self::Critical => "Critical",
            Self::Important => "Important",
            Self::CanWait => "CanWait",
        }
    }

    pub(crate) fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "unset" => Some(Self::Unset),
            "critical" => Some(Self::Critical),
            "important" => Some(Self::Important),
            "canwait" | "can wait" => Some(Self::CanWait),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Work,
    Study,
    Personal,
    Finance,
    Health,
    Other,
}

impl Default for Category {
    fn default() -> Self {
        Self::Other
    }
}

impl Category {
    pub(crate) fn all() -> [Self; 6] {
        [
            Self::Work,
            Self::Study,
            Self::Personal,
            Self::Finance,
            Self::Health,
            Self::Other,
        ]
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Study => "Study",
            Self::Personal => "Personal",
            Self::Finance => "Finance",
            Self::Health => "Health",
            Self::Other => "Other",
        }
    }

    pub(crate) fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "work" => Some(Self::Work),
            "study" => Some(Self::Study),
            "personal" => Some(Self::Personal),
            "finance" => Some(Self::Finance),
            "health" => Some(Self::Health),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// A single tracked to-do item. `reminder` stays a flat string on the wire:
/// `YYYY-MM-DDTHH:MM` fires once, bare `HH:MM` fires daily (optionally
/// bounded by `[start_date, end_date]`). The scheduler parses it into a
/// tagged type at its own boundary.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub reminder: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub subtasks: Option<Vec<Task>>,
}

/// Payload of the manual task form. Everything but the title is optional;
/// blank strings normalize to absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub title: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub reminder: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Category,
}

/// What the free-text parser managed to extract. Anything absent falls back
/// at task-construction time.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedTask {
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub time: Option<String>,
    pub reminder: Option<String>,
    pub priority: Priority,
    pub category: Category,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlanItem {
    pub time_slot: String,
    pub activity: String,
    pub is_break: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPlanDay {
    pub day: String,
    pub focus: String,
    pub tasks: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAnalysis {
    pub summary: String,
    pub positive_point: String,
    pub difficulty: String,
    pub suggestion: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizedTask {
    pub id: String,
    pub priority: Priority,
}

#[derive(Debug, Default, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub inbox: Vec<Task>,
    pub critical: Vec<Task>,
    pub important: Vec<Task>,
    pub can_wait: Vec<Task>,
    pub completed: Vec<Task>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: usize,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsStats {
    pub total: usize,
    pub completed: usize,
    pub open: usize,
    pub completion_ratio: f64,
    pub priority_counts: Vec<PriorityCount>,
    pub category_counts: Vec<CategoryCount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventResult {
    pub event_id: String,
    pub html_link: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDiagnostics {
    pub store_path: String,
    pub settings_path: String,
    pub tasks_count: usize,
    pub completed_count: usize,
    pub reminders_count: usize,
    pub latest_task_id: String,
    pub has_gemini_api_key: bool,
    pub has_calendar_token: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default)]
    pub client_id: String,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            calendar_id: default_calendar_id(),
            client_id: String::new(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationsSettings {
    #[serde(default)]
    pub calendar: CalendarSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_sec: u64,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default)]
    pub ui_preferences: Value,
    #[serde(default)]
    pub integrations: IntegrationsSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            poll_interval_sec: default_poll_interval(),
            default_model: default_model(),
            ui_preferences: json!({}),
            integrations: IntegrationsSettings::default(),
        }
    }
}

fn default_poll_interval() -> u64 {
    5
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

pub(crate) fn normalize_settings(mut settings: AppSettings) -> AppSettings {
    if settings.poll_interval_sec == 0 {
        settings.poll_interval_sec = default_poll_interval();
    }

    let model = settings.default_model.trim().to_string();
    settings.default_model = if model.is_empty() { default_model() } else { model };

    let calendar = &mut settings.integrations.calendar;
    let calendar_id = calendar.calendar_id.trim().to_string();
    calendar.calendar_id = if calendar_id.is_empty() {
        default_calendar_id()
    } else {
        calendar_id
    };
    calendar.client_id = calendar.client_id.trim().to_string();

    settings
}

/// One outstanding request per AI affordance; a second submission while the
/// flag is set fails fast instead of queueing.
#[derive(Default)]
pub struct OpFlags(pub Mutex<HashSet<&'static str>>);

impl OpFlags {
    pub(crate) fn begin(&self, op: &'static str) -> Result<(), String> {
        let mut guard = self
            .0
            .lock()
            .map_err(|error| format!("Lock poisoned: {error}"))?;
        if !guard.insert(op) {
            return Err(format!("Another {op} request is already running"));
        }
        Ok(())
    }

    pub(crate) fn end(&self, op: &'static str) {
        if let Ok(mut guard) = self.0.lock() {
            guard.remove(op);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_normalization_fills_defaults() {
        let mut settings = AppSettings::default();
        settings.poll_interval_sec = 0;
        settings.default_model = "  ".to_string();
        settings.integrations.calendar.calendar_id = "".to_string();

        let normalized = normalize_settings(settings);
        assert_eq!(normalized.poll_interval_sec, 5);
        assert_eq!(normalized.default_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(normalized.integrations.calendar.calendar_id, "primary");
    }

    #[test]
    fn priority_labels_round_trip() {
        for priority in Priority::all() {
            assert_eq!(Priority::from_label(priority.label()), Some(priority));
        }
        assert_eq!(Priority::from_label("can wait"), Some(Priority::CanWait));
        assert_eq!(Priority::from_label("urgent"), None);
    }

    #[test]
    fn category_labels_round_trip() {
        for category in Category::all() {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
        assert_eq!(Category::from_label("errands"), None);
    }

    #[test]
    fn op_flags_reject_duplicate_submission() {
        let flags = OpFlags::default();
        flags.begin("breakdown").expect("first submission");
        assert!(flags.begin("breakdown").is_err());
        flags.begin("prioritize").expect("independent operation");
        flags.end("breakdown");
        flags.begin("breakdown").expect("flag cleared");
    }
}
