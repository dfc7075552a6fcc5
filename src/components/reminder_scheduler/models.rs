use chrono::{DateTime, Utc};
use uuid::Uuid;

pub type ReminderId = Uuid;

/// A reminder waiting for its timer
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledReminder {
    pub id: ReminderId,
    pub to: String,
    pub body: String,
    pub fire_at: DateTime<Utc>,
}

impl ScheduledReminder {
    pub fn new(to: impl Into<String>, body: impl Into<String>, fire_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            to: to.into(),
            body: body.into(),
            fire_at,
        }
    }
}
