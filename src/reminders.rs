use crate::storage::settings_io::load_settings;
use crate::store::TaskStore;
use crate::types::{Task, TOAST_DISMISS_MS};
use chrono::{Local, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tauri::{AppHandle, Emitter};
use tauri_plugin_notification::{NotificationExt, PermissionState};

pub(crate) const CHIME_EVENT: &str = "reminder://chime";
pub(crate) const TOAST_EVENT: &str = "reminder://toast";

/// Tagged reminder shape, parsed from the flat stored string at the
/// scheduler boundary. `contains('T')` discriminates the two forms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reminder {
    Once(NaiveDateTime),
    Daily(NaiveTime),
}

impl Reminder {
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.contains('T') {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M")
                .ok()
                .map(Self::Once)
        } else {
            NaiveTime::parse_from_str(trimmed, "%H:%M")
                .ok()
                .map(Self::Daily)
        }
    }

    pub(crate) fn to_field(&self) -> String {
        match self {
            Self::Once(stamp) => stamp.format("%Y-%m-%dT%H:%M").to_string(),
            Self::Daily(time) => time.format("%H:%M").to_string(),
        }
    }
}

/// What one scheduler tick decided: at most one chime, a toast/notification
/// per due task, and the minute key to record when the chime fired.
#[derive(Debug, Default)]
pub(crate) struct TickOutcome {
    pub play_chime: bool,
    pub due: Vec<Task>,
    pub notified_minute: Option<String>,
}

/// Pure tick evaluation. The whole tick is skipped when the current minute
/// equals the last-notified key; the key is global across tasks so the
/// chime fires at most once per minute even when several tasks match.
pub(crate) fn evaluate_tick(
    tasks: &[Task],
    now: NaiveDateTime,
    last_notified: Option<&str>,
) -> TickOutcome {
    let minute_key = now.format("%Y-%m-%dT%H:%M").to_string();
    if last_notified == Some(minute_key.as_str()) {
        return TickOutcome::default();
    }

    let current_time = now.format("%H:%M").to_string();
    let current_date = now.format("%Y-%m-%d").to_string();

    let mut due = Vec::new();
    for task in tasks {
        if task.completed {
            continue;
        }
        let Some(raw) = task.reminder.as_deref() else {
            continue;
        };
        let Some(reminder) = Reminder::parse(raw) else {
            continue;
        };

        let matched = match reminder {
            Reminder::Once(stamp) => stamp.format("%Y-%m-%dT%H:%M").to_string() == minute_key,
            Reminder::Daily(time) => {
                time.format("%H:%M").to_string() == current_time
                    && match (task.start_date.as_deref(), task.end_date.as_deref()) {
                        (Some(start), Some(end)) => {
                            current_date.as_str() >= start && current_date.as_str() <= end
                        }
                        _ => true,
                    }
            }
        };

        if matched {
            due.push(task.clone());
        }
    }

    if due.is_empty() {
        TickOutcome::default()
    } else {
        TickOutcome {
            play_chime: true,
            due,
            notified_minute: Some(minute_key),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ToneSpec {
    pub waveform: &'static str,
    pub frequency_hz: f32,
    pub peak_gain: f32,
    pub attack_secs: f32,
    pub decay_secs: f32,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChimeSpec {
    pub tones: Vec<ToneSpec>,
}

/// Two-tone bell the webview synthesizes: a G5 fundamental with a long
/// decay and a G6 harmonic for brightness.
pub(crate) fn bell_chime() -> ChimeSpec {
    ChimeSpec {
        tones: vec![
            ToneSpec {
                waveform: "sine",
                frequency_hz: 784.0,
                peak_gain: 0.2,
                attack_secs: 0.05,
                decay_secs: 1.5,
            },
            ToneSpec {
                waveform: "triangle",
                frequency_hz: 1568.0,
                peak_gain: 0.05,
                attack_secs: 0.05,
                decay_secs: 1.0,
            },
        ],
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ToastPayload {
    pub task_id: String,
    pub message: String,
    pub dismiss_after_ms: u64,
}

/// Background polling loop. Reads the poll interval from settings on every
/// cycle so changes apply without a restart.
pub(crate) fn spawn_scheduler(app: AppHandle, store: Arc<Mutex<TaskStore>>) {
    thread::spawn(move || {
        let mut last_notified: Option<String> = None;
        loop {
            let interval = load_settings().poll_interval_sec.max(1);
            thread::sleep(Duration::from_secs(interval));

            let snapshot = match store.lock() {
                Ok(guard) => guard.snapshot(),
                Err(_) => continue,
            };

            let outcome = evaluate_tick(
                &snapshot,
                Local::now().naive_local(),
                last_notified.as_deref(),
            );

            if outcome.play_chime {
                let _ = app.emit(CHIME_EVENT, bell_chime());
            }
            if let Some(minute) = outcome.notified_minute {
                last_notified = Some(minute);
            }
            for task in &outcome.due {
                deliver_alert(&app, task);
            }
        }
    });
}

/// System notification when permission is granted, in-app toast otherwise.
fn deliver_alert(app: &AppHandle, task: &Task) {
    let title = format!("Reminder: {}", task.title);
    let body = format!("It is time for: {}", task.title);

    let granted = app
        .notification()
        .permission_state()
        .map(|state| matches!(state, PermissionState::Granted))
        .unwrap_or(false);

    if granted
        && app
            .notification()
            .builder()
            .title(&title)
            .body(&body)
            .show()
            .is_ok()
    {
        return;
    }

    let _ = app.emit(
        TOAST_EVENT,
        ToastPayload {
            task_id: task.id.clone(),
            message: title,
            dismiss_after_ms: TOAST_DISMISS_MS,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Priority};
    use chrono::NaiveDate;

    fn at(date: (i32, u32, u32), hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .expect("valid date")
            .and_hms_opt(hour, minute, 0)
            .expect("valid time")
    }

    fn reminder_task(id: &str, reminder: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {id}"),
            start_date: None,
            end_date: None,
            time: None,
            reminder: Some(reminder.to_string()),
            priority: Priority::Unset,
            category: Category::Other,
            completed: false,
            subtasks: None,
        }
    }

    #[test]
    fn reminder_strings_round_trip_through_the_tagged_type() {
        let once = Reminder::parse("2025-06-01T09:30").expect("once parses");
        assert_eq!(once.to_field(), "2025-06-01T09:30");
        let daily = Reminder::parse("07:00").expect("daily parses");
        assert_eq!(daily.to_field(), "07:00");
        assert_eq!(Reminder::parse(""), None);
        assert_eq!(Reminder::parse("soonish"), None);
        assert_eq!(Reminder::parse("2025-06-01T25:99"), None);
    }

    #[test]
    fn single_shot_fires_only_at_the_exact_minute() {
        let tasks = vec![reminder_task("a", "2025-06-01T09:30")];

        let hit = evaluate_tick(&tasks, at((2025, 6, 1), 9, 30), None);
        assert!(hit.play_chime);
        assert_eq!(hit.due.len(), 1);
        assert_eq!(hit.notified_minute.as_deref(), Some("2025-06-01T09:30"));

        for miss in [
            at((2025, 6, 1), 9, 29),
            at((2025, 6, 1), 9, 31),
            at((2025, 6, 2), 9, 30),
        ] {
            let outcome = evaluate_tick(&tasks, miss, None);
            assert!(!outcome.play_chime);
            assert!(outcome.due.is_empty());
        }
    }

    #[test]
    fn daily_reminder_without_range_fires_every_day() {
        let tasks = vec![reminder_task("a", "07:00")];
        for day in [(2025, 6, 1), (2025, 6, 2), (2026, 1, 15)] {
            let outcome = evaluate_tick(&tasks, at(day, 7, 0), None);
            assert_eq!(outcome.due.len(), 1);
        }
        assert!(evaluate_tick(&tasks, at((2025, 6, 1), 7, 1), None).due.is_empty());
    }

    #[test]
    fn daily_reminder_with_range_fires_inclusive_of_both_endpoints() {
        let mut task = reminder_task("a", "07:00");
        task.start_date = Some("2025-06-01".to_string());
        task.end_date = Some("2025-06-03".to_string());
        let tasks = vec![task];

        for day in [(2025, 6, 1), (2025, 6, 2), (2025, 6, 3)] {
            assert_eq!(evaluate_tick(&tasks, at(day, 7, 0), None).due.len(), 1);
        }
        for day in [(2025, 5, 31), (2025, 6, 4)] {
            assert!(evaluate_tick(&tasks, at(day, 7, 0), None).due.is_empty());
        }
    }

    #[test]
    fn daily_reminder_with_only_one_bound_behaves_as_unranged() {
        let mut task = reminder_task("a", "07:00");
        task.start_date = Some("2025-06-01".to_string());
        let outcome = evaluate_tick(&[task], at((2025, 5, 1), 7, 0), None);
        assert_eq!(outcome.due.len(), 1);
    }

    #[test]
    fn chime_fires_once_per_tick_but_every_match_is_notified() {
        let tasks = vec![
            reminder_task("a", "09:00"),
            reminder_task("b", "2025-06-01T09:00"),
        ];
        let outcome = evaluate_tick(&tasks, at((2025, 6, 1), 9, 0), None);
        assert!(outcome.play_chime);
        assert_eq!(outcome.due.len(), 2);
        assert_eq!(outcome.notified_minute.as_deref(), Some("2025-06-01T09:00"));
    }

    #[test]
    fn tick_is_skipped_entirely_within_an_already_notified_minute() {
        let tasks = vec![reminder_task("a", "09:00")];
        let outcome = evaluate_tick(&tasks, at((2025, 6, 1), 9, 0), Some("2025-06-01T09:00"));
        assert!(!outcome.play_chime);
        assert!(outcome.due.is_empty());
        assert!(outcome.notified_minute.is_none());

        let next_minute = evaluate_tick(&tasks, at((2025, 6, 1), 9, 1), Some("2025-06-01T09:00"));
        assert!(next_minute.due.is_empty());
    }

    #[test]
    fn completed_tasks_never_match() {
        let mut once = reminder_task("a", "2025-06-01T09:30");
        once.completed = true;
        let mut daily = reminder_task("b", "09:30");
        daily.completed = true;

        let outcome = evaluate_tick(&[once, daily], at((2025, 6, 1), 9, 30), None);
        assert!(!outcome.play_chime);
        assert!(outcome.due.is_empty());
    }

    #[test]
    fn malformed_reminders_are_ignored() {
        let tasks = vec![reminder_task("a", "around nine"), reminder_task("b", "9am")];
        let outcome = evaluate_tick(&tasks, at((2025, 6, 1), 9, 0), None);
        assert!(outcome.due.is_empty());
    }
}
