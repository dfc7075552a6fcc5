mod client;
pub mod models;
pub mod token;

pub use client::GoogleCalendarClient;
pub use models::{CalendarEvent, EventTime, NewEvent};

use crate::error::BotResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Calendar operations the dispatcher and HTTP layer rely on
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Insert one event and return it as stored by the provider
    async fn insert_event(&self, event: &NewEvent) -> BotResult<CalendarEvent>;

    /// Events starting in `[time_min, time_max)`, ordered by start time
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> BotResult<Vec<CalendarEvent>>;
}
