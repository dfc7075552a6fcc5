#![allow(dead_code)]

use async_trait::async_trait;
use chat_scheduler::components::google_calendar::{CalendarEvent, CalendarService, NewEvent};
use chat_scheduler::components::messaging::{MessagingService, SentMessage};
use chat_scheduler::components::reminder_scheduler::{ReminderId, ReminderScheduler};
use chat_scheduler::components::IntentClassifier;
use chat_scheduler::dispatch::Dispatcher;
use chat_scheduler::error::{
    classifier_error, google_calendar_error, messaging_error, scheduler_error, BotResult,
};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

pub const DEFAULT_RECIPIENT: &str = "+15550001111";

/// Calendar mock that records inserts and list windows
#[derive(Debug, Default)]
pub struct MockCalendar {
    events: Vec<CalendarEvent>,
    fail: bool,
    inserted: Mutex<Vec<NewEvent>>,
    listed: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn inserted(&self) -> Vec<NewEvent> {
        self.inserted.lock().unwrap().clone()
    }

    pub fn listed(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.listed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarService for MockCalendar {
    async fn insert_event(&self, event: &NewEvent) -> BotResult<CalendarEvent> {
        if self.fail {
            return Err(google_calendar_error("HTTP 401 Unauthorized"));
        }
        self.inserted.lock().unwrap().push(event.clone());

        Ok(CalendarEvent {
            id: "created1".to_string(),
            summary: Some(event.summary.clone()),
            description: event.description.clone(),
            start_date_time: Some(event.start.date_time.clone()),
            end_date_time: Some(event.end.date_time.clone()),
            ..Default::default()
        })
    }

    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> BotResult<Vec<CalendarEvent>> {
        if self.fail {
            return Err(google_calendar_error("HTTP 500 Backend Error"));
        }
        self.listed.lock().unwrap().push((time_min, time_max));
        Ok(self.events.clone())
    }
}

/// Messaging mock that records every message
#[derive(Debug, Default)]
pub struct MockMessaging {
    fail: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl MockMessaging {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingService for MockMessaging {
    async fn send_message(&self, to: &str, body: &str) -> BotResult<SentMessage> {
        if self.fail {
            return Err(messaging_error("HTTP 400 - invalid 'To' number"));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((to.to_string(), body.to_string()));

        Ok(SentMessage {
            sid: format!("SM{}", sent.len()),
            to: to.to_string(),
            status: "queued".to_string(),
        })
    }
}

/// Scheduler mock that only records what would have been scheduled
#[derive(Debug, Default)]
pub struct MockScheduler {
    fail: bool,
    scheduled: Mutex<Vec<(String, String, DateTime<Utc>)>>,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn scheduled(&self) -> Vec<(String, String, DateTime<Utc>)> {
        self.scheduled.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReminderScheduler for MockScheduler {
    async fn schedule_once(&self, to: &str, body: &str, fire_at: DateTime<Utc>) -> BotResult<ReminderId> {
        if self.fail {
            return Err(scheduler_error("Actor mailbox error: channel closed"));
        }
        self.scheduled
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string(), fire_at));
        Ok(uuid::Uuid::new_v4())
    }
}

/// Classifier mock returning a canned answer
#[derive(Debug, Default)]
pub struct MockClassifier {
    answer: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockClassifier {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl IntentClassifier for MockClassifier {
    async fn classify(&self, user_text: &str, _system_prompt: &str) -> BotResult<String> {
        self.prompts.lock().unwrap().push(user_text.to_string());
        self.answer
            .clone()
            .ok_or_else(|| classifier_error("OpenAI request failed: 429 Too Many Requests"))
    }
}

/// Dispatcher wired to the given mocks, in America/Los_Angeles
pub fn dispatcher(
    calendar: Arc<MockCalendar>,
    messaging: Arc<MockMessaging>,
    scheduler: Arc<MockScheduler>,
) -> Dispatcher {
    dispatcher_in(chrono_tz::America::Los_Angeles, calendar, messaging, scheduler)
}

pub fn dispatcher_in(
    timezone: chrono_tz::Tz,
    calendar: Arc<MockCalendar>,
    messaging: Arc<MockMessaging>,
    scheduler: Arc<MockScheduler>,
) -> Dispatcher {
    Dispatcher::new(calendar, messaging, scheduler, DEFAULT_RECIPIENT, timezone)
}

pub fn event(summary: &str, start: &str) -> CalendarEvent {
    CalendarEvent {
        id: summary.to_lowercase(),
        summary: Some(summary.to_string()),
        start_date_time: Some(start.to_string()),
        ..Default::default()
    }
}
