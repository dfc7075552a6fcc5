use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Start or end of an event as sent to the Calendar API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

/// Event to be inserted into the calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
}

/// Simplified calendar event representation
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub created: Option<String>,
    pub start_date_time: Option<String>,
    pub start_date: Option<String>,
    pub end_date_time: Option<String>,
    pub end_date: Option<String>,
}

impl CalendarEvent {
    /// Build from an event resource returned by the Calendar API
    pub fn from_json(event: &Value) -> Self {
        let text = |key: &str| event.get(key).and_then(|v| v.as_str()).map(|s| s.to_string());
        let nested = |outer: &str, inner: &str| {
            event
                .get(outer)
                .and_then(|o| o.get(inner))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };

        CalendarEvent {
            id: text("id").unwrap_or_default(),
            summary: text("summary"),
            description: text("description"),
            created: text("created"),
            start_date_time: nested("start", "dateTime"),
            start_date: nested("start", "date"),
            end_date_time: nested("end", "dateTime"),
            end_date: nested("end", "date"),
        }
    }

    /// Start time for display, falling back to the date of all-day events
    pub fn start_display(&self) -> &str {
        self.start_date_time
            .as_deref()
            .or(self.start_date.as_deref())
            .unwrap_or("unknown time")
    }

    /// Summary for display
    pub fn summary_display(&self) -> &str {
        self.summary.as_deref().unwrap_or("Untitled event")
    }
}
