use crate::providers::gemini;
use crate::types::{
    Category, DailyPlanItem, ParsedTask, PerformanceAnalysis, PrioritizedTask, Priority, Task,
    WeeklyPlanDay,
};
use crate::util::{sanitize_date, scalar_text, value_string_array, value_text};
use serde_json::{json, Value};

/// Turns one free-text sentence into a partial task. Callers fall back to a
/// raw-title task on any error; this function never invents defaults for the
/// title itself.
pub(crate) fn parse_task_from_input(model: &str, input: &str) -> Result<ParsedTask, String> {
    let schema = json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "startDate": { "type": "STRING", "description": "Start date YYYY-MM-DD if present" },
            "endDate": { "type": "STRING", "description": "End/due date YYYY-MM-DD if present" },
            "time": { "type": "STRING", "description": "HH:MM or a duration if present" },
            "reminder": {
                "type": "STRING",
                "description": "YYYY-MM-DDTHH:MM for a one-off reminder OR HH:MM for a recurring daily reminder"
            },
            "priority": { "type": "STRING", "enum": priority_labels() },
            "category": { "type": "STRING", "enum": category_labels() },
        },
        "required": ["title", "priority", "category"]
    });

    let payload = gemini::generate_structured(model, &build_parse_prompt(input), schema)?;
    Ok(parsed_task_from_value(&payload))
}

pub(crate) fn build_parse_prompt(input: &str) -> String {
    format!(
        "Turn the user's sentence into a structured task. Sentence: \"{input}\"\n\
         If the priority is unclear, assume \"Unset\". If the category is unclear, assume \"Other\".\n\
         \n\
         Rules for dates and reminders:\n\
         1. If the user names a period (e.g. \"for one month\", \"next week\"), fill startDate and endDate.\n\
         2. If the user asks to be reminded \"every day\" or \"daily\" within that period, set 'reminder' to the time only (HH:MM).\n\
         3. For a reminder on a single specific date, use the full ISO format (YYYY-MM-DDTHH:MM).\n\
         4. Keep the task's own time of day ('time') separate from the reminder ('reminder')."
    )
}

pub(crate) fn parsed_task_from_value(payload: &Value) -> ParsedTask {
    ParsedTask {
        title: value_text(payload, "title"),
        start_date: sanitize_date(value_text(payload, "startDate")),
        end_date: sanitize_date(value_text(payload, "endDate")),
        time: value_text(payload, "time"),
        reminder: value_text(payload, "reminder"),
        priority: value_text(payload, "priority")
            .and_then(|label| Priority::from_label(&label))
            .unwrap_or_default(),
        category: value_text(payload, "category")
            .and_then(|label| Category::from_label(&label))
            .unwrap_or_default(),
    }
}

/// Classifies every listed task as Critical, Important or CanWait. The model
/// may return a subset; unknown ids are dropped at application time.
pub(crate) fn prioritize_tasks(model: &str, tasks: &[Task]) -> Result<Vec<PrioritizedTask>, String> {
    let schema = json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING" },
                "priority": {
                    "type": "STRING",
                    "enum": ["Critical", "Important", "CanWait"]
                },
            },
            "required": ["id", "priority"]
        }
    });

    let payload = gemini::generate_structured(model, &build_prioritize_prompt(tasks), schema)?;
    Ok(prioritized_from_value(&payload))
}

pub(crate) fn build_prioritize_prompt(tasks: &[Task]) -> String {
    let lines = tasks
        .iter()
        .map(|task| {
            let dates = match (task.start_date.as_deref(), task.end_date.as_deref()) {
                (Some(start), Some(end)) => format!("{start} to {end}"),
                (_, Some(end)) => end.to_string(),
                (Some(start), None) => start.to_string(),
                (None, None) => "no date".to_string(),
            };
            format!("- ID: {}, Title: {}, Date: {}", task.id, task.title, dates)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Review the task list below and classify each one as \"Critical\", \"Important\" or \"CanWait\".\n\
         Weigh implicit deadlines, impact and effort.\n\
         Tasks:\n\
         {lines}"
    )
}

pub(crate) fn prioritized_from_value(payload: &Value) -> Vec<PrioritizedTask> {
    payload
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let id = value_text(item, "id")?;
                    let priority = value_text(item, "priority")
                        .and_then(|label| Priority::from_label(&label))
                        .filter(|priority| *priority != Priority::Unset)?;
                    Some(PrioritizedTask { id, priority })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Builds a day plan for the open tasks, starting at 08:00 with short breaks.
/// Output order is presentation order.
pub(crate) fn generate_daily_plan(model: &str, tasks: &[Task]) -> Result<Vec<DailyPlanItem>, String> {
    let schema = json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "timeSlot": { "type": "STRING", "description": "e.g. 08:00 - 09:00" },
                "activity": { "type": "STRING" },
                "isBreak": { "type": "BOOLEAN" },
            },
            "required": ["timeSlot", "activity", "isBreak"]
        }
    });

    let payload = gemini::generate_structured(model, &build_daily_plan_prompt(tasks), schema)?;
    Ok(daily_plan_from_value(&payload))
}

pub(crate) fn build_daily_plan_prompt(tasks: &[Task]) -> String {
    let lines = tasks
        .iter()
        .filter(|task| !task.completed)
        .map(|task| {
            let deadline = task
                .end_date
                .as_deref()
                .map(|end| format!(" [Due: {end}]"))
                .unwrap_or_default();
            format!(
                "{}{} ({})",
                task.title,
                deadline,
                task.time.as_deref().unwrap_or("30m")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Build an efficient daily plan starting at 08:00 from the tasks below.\n\
         Rules:\n\
         - Start with the most important tasks (infer from title and deadline)\n\
         - Group similar tasks together\n\
         - Insert short breaks (15m) every 2 hours or so\n\
         - Do not overload the user\n\
         \n\
         Available tasks:\n\
         {lines}"
    )
}

pub(crate) fn daily_plan_from_value(payload: &Value) -> Vec<DailyPlanItem> {
    payload
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| DailyPlanItem {
                    time_slot: value_text(item, "timeSlot").unwrap_or_else(|| "00:00".to_string()),
                    activity: value_text(item, "activity").unwrap_or_else(|| "Activity".to_string()),
                    is_break: item
                        .get("isBreak")
                        .and_then(Value::as_bool)
                        .unwrap_or(false),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Spreads the open tasks over a 5-7 day week, balanced and deadline-aware.
pub(crate) fn generate_weekly_plan(model: &str, tasks: &[Task]) -> Result<Vec<WeeklyPlanDay>, String> {
    let schema = json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "day": { "type": "STRING", "description": "Day of the week (Monday, Tuesday...)" },
                "focus": { "type": "STRING", "description": "Main focus of the day (e.g. Admin, Study...)" },
                "tasks": { "type": "ARRAY", "items": { "type": "STRING" } },
            },
            "required": ["day", "focus", "tasks"]
        }
    });

    let payload = gemini::generate_structured(model, &build_weekly_plan_prompt(tasks), schema)?;
    Ok(weekly_plan_from_value(&payload))
}

pub(crate) fn build_weekly_plan_prompt(tasks: &[Task]) -> String {
    let lines = tasks
        .iter()
        .filter(|task| !task.completed)
        .map(|task| {
            format!(
                "- {} (Priority: {}, Category: {}, Due: {})",
                task.title,
                task.priority.label(),
                task.category.label(),
                task.end_date.as_deref().unwrap_or("none")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Spread the week's tasks out evenly.\n\
         \n\
         Rules:\n\
         - Distribute heavy tasks across the week to avoid overload.\n\
         - Group tasks by context when possible.\n\
         - Respect deadlines when present.\n\
         - Produce a 5 to 7 day plan depending on how many tasks there are.\n\
         \n\
         Tasks:\n\
         {lines}"
    )
}

pub(crate) fn weekly_plan_from_value(payload: &Value) -> Vec<WeeklyPlanDay> {
    payload
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| WeeklyPlanDay {
                    day: value_text(item, "day").unwrap_or_else(|| "Day".to_string()),
                    focus: value_text(item, "focus").unwrap_or_else(|| "General".to_string()),
                    tasks: value_string_array(item, "tasks"),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Splits one task into small actionable steps, each doable in ~30 minutes.
pub(crate) fn break_down_task(model: &str, task_title: &str) -> Result<Vec<String>, String> {
    let schema = json!({
        "type": "ARRAY",
        "items": { "type": "STRING" }
    });

    let payload = gemini::generate_structured(model, &build_breakdown_prompt(task_title), schema)?;
    Ok(breakdown_from_value(&payload))
}

pub(crate) fn build_breakdown_prompt(task_title: &str) -> String {
    format!(
        "Break the task below into small practical steps, each easy to finish in 30 minutes or less.\n\
         Task: \"{task_title}\""
    )
}

pub(crate) fn breakdown_from_value(payload: &Value) -> Vec<String> {
    payload
        .as_array()
        .map(|items| items.iter().filter_map(scalar_text).collect())
        .unwrap_or_default()
}

/// Narrative performance review over the completed / unfinished title sets.
pub(crate) fn analyze_performance(
    model: &str,
    completed: &[Task],
    not_completed: &[Task],
) -> Result<PerformanceAnalysis, String> {
    let schema = json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "positivePoint": { "type": "STRING" },
            "difficulty": { "type": "STRING" },
            "suggestion": { "type": "STRING" },
        },
        "required": ["summary", "positivePoint", "difficulty", "suggestion"]
    });

    let payload = gemini::generate_structured(
        model,
        &build_analysis_prompt(completed, not_completed),
        schema,
    )?;
    Ok(analysis_from_value(&payload))
}

pub(crate) fn build_analysis_prompt(completed: &[Task], not_completed: &[Task]) -> String {
    let completed_titles = titles_of(completed);
    let open_titles = titles_of(not_completed);

    format!(
        "Review the user's performance based on the information below.\n\
         \n\
         Completed tasks: {completed_titles}\n\
         Unfinished tasks: {open_titles}\n\
         \n\
         Deliver:\n\
         - a summary of the day\n\
         - one positive point\n\
         - the most likely difficulty faced\n\
         - one practical suggestion for tomorrow"
    )
}

fn titles_of(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|task| task.title.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn analysis_from_value(payload: &Value) -> PerformanceAnalysis {
    PerformanceAnalysis {
        summary: value_text(payload, "summary")
            .unwrap_or_else(|| "Not enough data yet.".to_string()),
        positive_point: value_text(payload, "positivePoint")
            .unwrap_or_else(|| "Keep logging your tasks.".to_string()),
        difficulty: value_text(payload, "difficulty")
            .unwrap_or_else(|| "No particular difficulty detected.".to_string()),
        suggestion: value_text(payload, "suggestion")
            .unwrap_or_else(|| "Try finishing one small task first.".to_string()),
    }
}

/// One short push to get the user started on a task. Plain text, no schema.
pub(crate) fn motivational_message(model: &str, task: &Task) -> Result<String, String> {
    gemini::generate_text(model, &build_motivation_prompt(task))
}

pub(crate) fn build_motivation_prompt(task: &Task) -> String {
    format!(
        "Write a short, practical, motivating message to get the user started on the task: \"{}\".\n\
         Context: its priority is {}.\n\
         Keep it under 20 words. Avoid cliches.",
        task.title,
        task.priority.label()
    )
}

fn priority_labels() -> Vec<&'static str> {
    Priority::all().iter().map(|item| item.label()).collect()
}

fn category_labels() -> Vec<&'static str> {
    Category::all().iter().map(|item| item.label()).collect()
}
