use crate::error::{Action, DispatchError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// The five intents the dispatcher acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    CreateEvent,
    SendReminder,
    QuerySchedule,
    ScheduleTextReminder,
    CreateReminder,
}

impl IntentKind {
    /// Match the classifier's intent name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "create_event" => Some(IntentKind::CreateEvent),
            "send_reminder" => Some(IntentKind::SendReminder),
            "query_schedule" => Some(IntentKind::QuerySchedule),
            "schedule_text_reminder" => Some(IntentKind::ScheduleTextReminder),
            "create_reminder" => Some(IntentKind::CreateReminder),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IntentKind::CreateEvent => "create_event",
            IntentKind::SendReminder => "send_reminder",
            IntentKind::QuerySchedule => "query_schedule",
            IntentKind::ScheduleTextReminder => "schedule_text_reminder",
            IntentKind::CreateReminder => "create_reminder",
        }
    }

    pub fn action(self) -> Action {
        match self {
            IntentKind::CreateEvent => Action::CreateEvent,
            IntentKind::SendReminder => Action::SendReminder,
            IntentKind::QuerySchedule => Action::QuerySchedule,
            IntentKind::ScheduleTextReminder => Action::ScheduleReminder,
            IntentKind::CreateReminder => Action::CreateReminder,
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEventDetails {
    pub summary: String,
    pub description: Option<String>,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReminderDetails {
    pub to: String,
    pub summary: String,
    pub start: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryScheduleDetails {
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTextReminderDetails {
    pub summary: String,
    /// Absolute timestamp or a relative phrase such as "10 minutes"
    pub reminder_time: String,
    /// Event time relative phrases count back from; now when absent
    pub datetime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReminderDetails {
    pub title: String,
    pub date: String,
}

/// A classified command with its validated details
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    CreateEvent(CreateEventDetails),
    SendReminder(SendReminderDetails),
    QuerySchedule(QueryScheduleDetails),
    ScheduleTextReminder(ScheduleTextReminderDetails),
    CreateReminder(CreateReminderDetails),
}

// Wire shapes of the details payload. Every field is optional here so that
// absent values surface as MissingRequiredField rather than a serde error.

#[derive(Debug, Default, Deserialize)]
struct RawCreateEvent {
    summary: Option<String>,
    description: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEventStart {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEventRef {
    summary: Option<String>,
    start: Option<RawEventStart>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSendReminder {
    to: Option<String>,
    event: Option<RawEventRef>,
}

#[derive(Debug, Default, Deserialize)]
struct RawQuerySchedule {
    date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawScheduleTextReminder {
    summary: Option<String>,
    reminder_time: Option<String>,
    datetime: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCreateReminder {
    title: Option<String>,
    date: Option<String>,
}

/// Blank strings count as missing
fn require(action: Action, field: &'static str, value: Option<String>) -> Result<String, DispatchError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(DispatchError::MissingRequiredField { action, field })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn details_as<T: DeserializeOwned + Default>(action: Action, details: Value) -> Result<T, DispatchError> {
    if details.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(details).map_err(|e| DispatchError::InvalidDetails {
        action,
        reason: e.to_string(),
    })
}

impl Intent {
    /// Parse and validate raw classifier output.
    ///
    /// Invalid JSON is `MalformedClassifierOutput`; a missing, empty, or
    /// unknown intent name is `UnrecognizedIntent`; details lacking a required
    /// field are `MissingRequiredField`.
    pub fn parse(raw: &str) -> Result<Intent, DispatchError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| DispatchError::MalformedClassifierOutput(e.to_string()))?;

        let name = match value.get("intent") {
            Some(Value::String(name)) if !name.is_empty() => name.as_str(),
            Some(Value::String(_)) | Some(Value::Null) | None => {
                return Err(DispatchError::UnrecognizedIntent(None))
            }
            Some(other) => return Err(DispatchError::UnrecognizedIntent(Some(other.to_string()))),
        };
        let kind = IntentKind::from_name(name)
            .ok_or_else(|| DispatchError::UnrecognizedIntent(Some(name.to_string())))?;

        let details = value.get("details").cloned().unwrap_or(Value::Null);
        Self::from_details(kind, details)
    }

    /// Validate a details payload for an already recognized intent
    pub fn from_details(kind: IntentKind, details: Value) -> Result<Intent, DispatchError> {
        let action = kind.action();

        let intent = match kind {
            IntentKind::CreateEvent => {
                let raw: RawCreateEvent = details_as(action, details)?;
                Intent::CreateEvent(CreateEventDetails {
                    summary: require(action, "summary", raw.summary)?,
                    description: non_blank(raw.description),
                    start: require(action, "start", raw.start)?,
                    end: require(action, "end", raw.end)?,
                })
            }
            IntentKind::SendReminder => {
                let raw: RawSendReminder = details_as(action, details)?;
                let to = require(action, "to", raw.to)?;
                let event = raw.event.unwrap_or_default();
                Intent::SendReminder(SendReminderDetails {
                    to,
                    summary: require(action, "event.summary", event.summary)?,
                    start: require(
                        action,
                        "event.start.dateTime",
                        event.start.and_then(|start| start.date_time),
                    )?,
                })
            }
            IntentKind::QuerySchedule => {
                let raw: RawQuerySchedule = details_as(action, details)?;
                Intent::QuerySchedule(QueryScheduleDetails {
                    date: require(action, "date", raw.date)?,
                })
            }
            IntentKind::ScheduleTextReminder => {
                let raw: RawScheduleTextReminder = details_as(action, details)?;
                Intent::ScheduleTextReminder(ScheduleTextReminderDetails {
                    summary: require(action, "summary", raw.summary)?,
                    reminder_time: require(action, "reminder_time", raw.reminder_time)?,
                    datetime: non_blank(raw.datetime),
                })
            }
            IntentKind::CreateReminder => {
                let raw: RawCreateReminder = details_as(action, details)?;
                Intent::CreateReminder(CreateReminderDetails {
                    title: require(action, "title", raw.title)?,
                    date: require(action, "date", raw.date)?,
                })
            }
        };

        Ok(intent)
    }

    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::CreateEvent(_) => IntentKind::CreateEvent,
            Intent::SendReminder(_) => IntentKind::SendReminder,
            Intent::QuerySchedule(_) => IntentKind::QuerySchedule,
            Intent::ScheduleTextReminder(_) => IntentKind::ScheduleTextReminder,
            Intent::CreateReminder(_) => IntentKind::CreateReminder,
        }
    }
}
