use crate::reminders::Reminder;
use crate::types::{
    CalendarEventResult, Task, CALENDAR_API_BASE_URL, CALENDAR_AUTH_URL, CALENDAR_SCOPE,
    CALENDAR_TOKEN_URL, CALENDAR_TOKEN_USERNAME, KEYRING_SERVICE,
};
use chrono::{Duration as ChronoDuration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use keyring::{Entry, Error as KeyringError};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration as StdDuration;

const CALENDAR_TIMEOUT_SECS: u64 = 30;

pub(crate) fn calendar_keyring_entry() -> Result<Entry, String> {
    Entry::new(KEYRING_SERVICE, CALENDAR_TOKEN_USERNAME).map_err(|error| error.to_string())
}

pub(crate) fn resolve_calendar_token(token: Option<String>) -> Result<String, String> {
    if let Some(provided) = token {
        if !provided.trim().is_empty() {
            return Ok(provided.trim().to_string());
        }
    }

    let entry = calendar_keyring_entry()?;
    match entry.get_password() {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Ok(_) => Err("Missing calendar access token. Connect the calendar first.".to_string()),
        Err(KeyringError::NoEntry) => {
            Err("Missing calendar access token. Connect the calendar first.".to_string())
        }
        Err(error) => Err(error.to_string()),
    }
}

/// Where the exported event lands on the clock. Timed events carry local
/// naive datetimes; they gain an offset only when the request body is built.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EventTimes {
    Timed {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    AllDay {
        start_date: String,
        end_date: String,
    },
}

/// Start/end derivation order: single-shot reminder, then start-date plus a
/// parseable time of day, then start-date alone as all-day, then a fallback
/// of tomorrow 09:00-10:00.
pub(crate) fn derive_event_times(task: &Task, now: NaiveDateTime) -> EventTimes {
    if let Some(Reminder::Once(stamp)) = task.reminder.as_deref().and_then(Reminder::parse) {
        return EventTimes::Timed {
            start: stamp,
            end: stamp + ChronoDuration::hours(1),
        };
    }

    if let Some(start_date) = task
        .start_date
        .as_deref()
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
    {
        if let Some(time) = task.time.as_deref().and_then(find_time_of_day) {
            let start = start_date.and_time(time);
            return EventTimes::Timed {
                start,
                end: start + ChronoDuration::hours(1),
            };
        }

        let start = start_date.format("%Y-%m-%d").to_string();
        let end = task
            .end_date
            .clone()
            .filter(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok())
            .unwrap_or_else(|| start.clone());
        return EventTimes::AllDay {
            start_date: start,
            end_date: end,
        };
    }

    let start = (now.date() + ChronoDuration::days(1))
        .and_hms_opt(9, 0, 0)
        .unwrap_or(now);
    EventTimes::Timed {
        start,
        end: start + ChronoDuration::hours(1),
    }
}

/// Finds the first `H:MM`-looking fragment anywhere in a free-text time
/// hint ("14:30", "at 9:15"). Duration hints like "30m" yield nothing.
pub(crate) fn find_time_of_day(text: &str) -> Option<NaiveTime> {
    let chars: Vec<char> = text.chars().collect();
    for (index, ch) in chars.iter().enumerate() {
        if *ch != ':' {
            continue;
        }
        let mut start = index;
        while start > 0 && chars[start - 1].is_ascii_digit() {
            start -= 1;
        }
        let mut end = index + 1;
        while end < chars.len() && chars[end].is_ascii_digit() {
            end += 1;
        }
        if start == index || end == index + 1 {
            continue;
        }

        let hour: u32 = chars[start..index].iter().collect::<String>().parse().ok()?;
        let minute: u32 = chars[index + 1..end].iter().collect::<String>().parse().ok()?;
        if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
            return Some(time);
        }
    }
    None
}

pub(crate) fn build_auth_url(client_id: &str, redirect_uri: &str) -> Result<String, String> {
    if client_id.trim().is_empty() {
        return Err("Calendar client id is not configured. Set it in Settings first.".to_string());
    }

    let url = reqwest::Url::parse_with_params(
        CALENDAR_AUTH_URL,
        &[
            ("client_id", client_id.trim()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", CALENDAR_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|error| error.to_string())?;
    Ok(url.to_string())
}

/// Authorization-code exchange; returns the granted access token.
pub(crate) fn exchange_auth_code(
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<String, String> {
    let client = Client::builder()
        .timeout(StdDuration::from_secs(CALENDAR_TIMEOUT_SECS))
        .build()
        .map_err(|error| error.to_string())?;

    let response = client
        .post(CALENDAR_TOKEN_URL)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .map_err(|error| error.to_string())?;

    let status = response.status();
    let body = response.text().map_err(|error| error.to_string())?;
    if !status.is_success() {
        return Err(format!("Calendar token API {}: {body}", status.as_u16()));
    }

    let value: Value = serde_json::from_str(&body).map_err(|error| error.to_string())?;
    value
        .get("access_token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| "Calendar token response missing access_token".to_string())
}

pub(crate) fn create_event(
    task: &Task,
    calendar_id: &str,
    token: &str,
) -> Result<CalendarEventResult, String> {
    let times = derive_event_times(task, Local::now().naive_local());
    let (start, end) = match times {
        EventTimes::Timed { start, end } => (
            json!({ "dateTime": to_rfc3339_local(start)? }),
            json!({ "dateTime": to_rfc3339_local(end)? }),
        ),
        EventTimes::AllDay {
            start_date,
            end_date,
        } => (json!({ "date": start_date }), json!({ "date": end_date })),
    };

    let event = json!({
        "summary": task.title,
        "description": format!(
            "Priority: {}\nCategory: {}\nCreated by Focus Deck",
            task.priority.label(),
            task.category.label()
        ),
        "start": start,
        "end": end,
    });

    let client = Client::builder()
        .timeout(StdDuration::from_secs(CALENDAR_TIMEOUT_SECS))
        .build()
        .map_err(|error| error.to_string())?;

    let response = client
        .post(format!("{CALENDAR_API_BASE_URL}/{calendar_id}/events"))
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .json(&event)
        .send()
        .map_err(|error| error.to_string())?;

    let status = response.status();
    let body = response.text().map_err(|error| error.to_string())?;
    if !status.is_success() {
        return Err(format!("Calendar API {}: {body}", status.as_u16()));
    }

    let value: Value = serde_json::from_str(&body).map_err(|error| error.to_string())?;
    let event_id = value
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| "Calendar response missing event id".to_string())?;
    let html_link = value
        .get("htmlLink")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(CalendarEventResult {
        event_id,
        html_link,
    })
}

fn to_rfc3339_local(naive: NaiveDateTime) -> Result<String, String> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|stamp| stamp.to_rfc3339())
        .ok_or_else(|| "Could not resolve local time for the event".to_string())
}
