// Export components
pub mod classifier;
pub mod google_calendar;
pub mod messaging;
pub mod reminder_scheduler;

pub use classifier::{IntentClassifier, OpenAiClassifier};
pub use google_calendar::{CalendarService, GoogleCalendarClient};
pub use messaging::{MessagingService, TwilioClient};
pub use reminder_scheduler::{ReminderScheduler, ReminderSchedulerHandle};
