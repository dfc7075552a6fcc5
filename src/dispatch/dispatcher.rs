use super::intent::{
    CreateEventDetails, CreateReminderDetails, Intent, QueryScheduleDetails, ScheduleTextReminderDetails,
    SendReminderDetails,
};
use crate::components::google_calendar::{CalendarService, EventTime, NewEvent};
use crate::components::messaging::MessagingService;
use crate::components::reminder_scheduler::ReminderScheduler;
use crate::error::{Action, DispatchError, Error};
use crate::utils::time::{localize, parse_timestamp, resolve, to_iso_string};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Routes classified commands to the calendar, messaging and reminder services
#[derive(Clone)]
pub struct Dispatcher {
    calendar: Arc<dyn CalendarService>,
    messaging: Arc<dyn MessagingService>,
    scheduler: Arc<dyn ReminderScheduler>,
    default_recipient: String,
    timezone: Tz,
}

fn adapter_failure(action: Action) -> impl FnOnce(Error) -> DispatchError {
    move |source| DispatchError::AdapterFailure { action, source }
}

impl Dispatcher {
    pub fn new(
        calendar: Arc<dyn CalendarService>,
        messaging: Arc<dyn MessagingService>,
        scheduler: Arc<dyn ReminderScheduler>,
        default_recipient: impl Into<String>,
        timezone: Tz,
    ) -> Self {
        Self {
            calendar,
            messaging,
            scheduler,
            default_recipient: default_recipient.into(),
            timezone,
        }
    }

    /// Carry out the command in `raw_classifier_output` and describe the result.
    ///
    /// Never fails: every rejection and adapter error becomes the answer text.
    pub async fn dispatch(&self, raw_classifier_output: &str) -> String {
        match self.try_dispatch(raw_classifier_output).await {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    DispatchError::MalformedClassifierOutput(_) => {
                        error!("Error parsing classifier output: {} ({:?})", e, raw_classifier_output)
                    }
                    DispatchError::AdapterFailure { .. }
                    | DispatchError::UnsupportedTimeUnit { .. }
                    | DispatchError::InvalidTimestamp { .. } => error!("{}", e),
                    _ => warn!("{}", e),
                }
                e.response()
            }
        }
    }

    /// Like [`Dispatcher::dispatch`] but keeps the failure typed
    pub async fn try_dispatch(&self, raw_classifier_output: &str) -> Result<String, DispatchError> {
        let intent = Intent::parse(raw_classifier_output)?;
        info!("Dispatching intent {}: {:?}", intent.kind(), intent);

        match intent {
            Intent::CreateEvent(details) => self.create_event(details).await,
            Intent::SendReminder(details) => self.send_reminder(details).await,
            Intent::QuerySchedule(details) => self.query_schedule(details).await,
            Intent::ScheduleTextReminder(details) => self.schedule_text_reminder(details).await,
            Intent::CreateReminder(details) => self.create_reminder(details).await,
        }
    }

    async fn create_event(&self, details: CreateEventDetails) -> Result<String, DispatchError> {
        let time_zone = self.timezone.name().to_string();
        let event = NewEvent {
            summary: details.summary.clone(),
            description: details.description,
            start: EventTime {
                date_time: details.start.clone(),
                time_zone: time_zone.clone(),
            },
            end: EventTime {
                date_time: details.end,
                time_zone,
            },
        };

        self.calendar
            .insert_event(&event)
            .await
            .map_err(adapter_failure(Action::CreateEvent))?;

        Ok(format!("Event created: {} on {}", details.summary, details.start))
    }

    async fn send_reminder(&self, details: SendReminderDetails) -> Result<String, DispatchError> {
        let body = format!("Reminder: {} on {}", details.summary, details.start);

        self.messaging
            .send_message(&details.to, &body)
            .await
            .map_err(adapter_failure(Action::SendReminder))?;

        Ok(format!(
            "Reminder sent to {} for event: {}",
            details.to, details.summary
        ))
    }

    async fn query_schedule(&self, details: QueryScheduleDetails) -> Result<String, DispatchError> {
        let action = Action::QuerySchedule;
        let invalid_date = || DispatchError::InvalidTimestamp {
            action,
            value: details.date.clone(),
        };

        let day = NaiveDate::parse_from_str(details.date.trim(), "%Y-%m-%d")
            .ok()
            .or_else(|| {
                parse_timestamp(&details.date, &self.timezone)
                    .map(|dt| dt.with_timezone(&self.timezone).date_naive())
            })
            .ok_or_else(invalid_date)?;

        let start_of_day = |date: NaiveDate| date.and_hms_opt(0, 0, 0).and_then(|n| localize(&n, &self.timezone));
        let time_min = start_of_day(day).ok_or_else(invalid_date)?;
        let time_max = day
            .succ_opt()
            .and_then(start_of_day)
            .ok_or_else(invalid_date)?;

        let events = self
            .calendar
            .list_events(time_min, time_max)
            .await
            .map_err(adapter_failure(action))?;

        if events.is_empty() {
            return Ok(format!("No events scheduled for {}", details.date));
        }

        let event_list = events
            .iter()
            .map(|event| format!("{} at {}", event.summary_display(), event.start_display()))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(format!("Events for {}:\n{}", details.date, event_list))
    }

    /// `reminder_time` is tried as an absolute timestamp first and only then
    /// as a phrase counted back from `datetime`
    async fn schedule_text_reminder(
        &self,
        details: ScheduleTextReminderDetails,
    ) -> Result<String, DispatchError> {
        let action = Action::ScheduleReminder;
        let now = Utc::now();

        let fire_at = match parse_timestamp(&details.reminder_time, &self.timezone) {
            Some(absolute) => absolute,
            None => {
                let reference = match &details.datetime {
                    Some(datetime) => parse_timestamp(datetime, &self.timezone).ok_or_else(|| {
                        DispatchError::InvalidTimestamp {
                            action,
                            value: datetime.clone(),
                        }
                    })?,
                    None => now,
                };

                resolve(&details.reminder_time, &reference.with_timezone(&self.timezone))
                    .map_err(|source| DispatchError::UnsupportedTimeUnit { action, source })?
                    .with_timezone(&Utc)
            }
        };

        self.schedule(action, &details.summary, fire_at, now).await?;

        Ok(format!(
            "Scheduled reminder for {} on {}",
            details.summary,
            to_iso_string(&fire_at)
        ))
    }

    async fn create_reminder(&self, details: CreateReminderDetails) -> Result<String, DispatchError> {
        let action = Action::CreateReminder;
        let now = Utc::now();

        let fire_at = parse_timestamp(&details.date, &self.timezone).ok_or_else(|| {
            DispatchError::InvalidTimestamp {
                action,
                value: details.date.clone(),
            }
        })?;

        self.schedule(action, &details.title, fire_at, now).await?;

        Ok(format!(
            "Created reminder for {} on {}",
            details.title,
            to_iso_string(&fire_at)
        ))
    }

    /// Schedule "Reminder: {subject}" to the default recipient, refusing times not after `now`
    async fn schedule(
        &self,
        action: Action,
        subject: &str,
        fire_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), DispatchError> {
        if fire_at <= now {
            warn!("Reminder date is in the past: {}", fire_at);
            return Err(DispatchError::PastScheduleTime { action });
        }

        let body = format!("Reminder: {}", subject);
        info!(
            "Scheduling reminder to {} at {}: {}",
            self.default_recipient, fire_at, body
        );

        self.scheduler
            .schedule_once(&self.default_recipient, &body, fire_at)
            .await
            .map_err(adapter_failure(action))?;

        Ok(())
    }
}
