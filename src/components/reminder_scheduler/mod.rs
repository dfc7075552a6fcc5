//! Fire-once SMS reminders.
//!
//! Timers live only in process memory: a restart silently drops every
//! pending reminder, and a scheduled reminder cannot be cancelled.

mod actor;
mod handle;
pub mod models;

pub use handle::ReminderSchedulerHandle;
pub use models::{ReminderId, ScheduledReminder};

use crate::error::BotResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Schedules a message to be sent once at a given instant
#[async_trait]
pub trait ReminderScheduler: Send + Sync {
    async fn schedule_once(&self, to: &str, body: &str, fire_at: DateTime<Utc>) -> BotResult<ReminderId>;
}
