use crate::utils::time::TimeError;
use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(chat_scheduler::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(chat_scheduler::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(chat_scheduler::google_calendar))]
    GoogleCalendar(String),

    #[error("Messaging API error: {0}")]
    #[diagnostic(code(chat_scheduler::messaging))]
    Messaging(String),

    #[error("Classifier error: {0}")]
    #[diagnostic(code(chat_scheduler::classifier))]
    Classifier(String),

    #[error("Scheduler error: {0}")]
    #[diagnostic(code(chat_scheduler::scheduler))]
    Scheduler(String),

    #[error(transparent)]
    #[diagnostic(code(chat_scheduler::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(chat_scheduler::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(chat_scheduler::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create messaging errors
pub fn messaging_error(message: &str) -> Error {
    Error::Messaging(message.to_string())
}

/// Helper to create classifier errors
pub fn classifier_error(message: &str) -> Error {
    Error::Classifier(message.to_string())
}

/// Helper to create scheduler errors
pub fn scheduler_error(message: &str) -> Error {
    Error::Scheduler(message.to_string())
}

/// The action a dispatched intent performs, used to phrase rejection messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateEvent,
    SendReminder,
    QuerySchedule,
    ScheduleReminder,
    CreateReminder,
}

impl Action {
    /// "creating event", "scheduling reminder", ...
    pub fn gerund(self) -> &'static str {
        match self {
            Action::CreateEvent => "creating event",
            Action::SendReminder => "sending reminder",
            Action::QuerySchedule => "querying schedule",
            Action::ScheduleReminder => "scheduling reminder",
            Action::CreateReminder => "creating reminder",
        }
    }

    /// "create event", "schedule reminder", ...
    pub fn verb(self) -> &'static str {
        match self {
            Action::CreateEvent => "create event",
            Action::SendReminder => "send reminder",
            Action::QuerySchedule => "query schedule",
            Action::ScheduleReminder => "schedule reminder",
            Action::CreateReminder => "create reminder",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.gerund())
    }
}

/// Everything that can stop a classified command from being carried out.
///
/// None of these reach the HTTP layer as a fault: the dispatcher turns each
/// one into a plain-text answer through [`DispatchError::response`].
#[derive(Debug, Error, Diagnostic)]
pub enum DispatchError {
    #[error("Classifier output is not valid JSON: {0}")]
    #[diagnostic(code(chat_scheduler::dispatch::malformed_output))]
    MalformedClassifierOutput(String),

    #[error("Unrecognized intent: {0:?}")]
    #[diagnostic(code(chat_scheduler::dispatch::unrecognized_intent))]
    UnrecognizedIntent(Option<String>),

    #[error("Missing required field '{field}' for {action}")]
    #[diagnostic(code(chat_scheduler::dispatch::missing_field))]
    MissingRequiredField { action: Action, field: &'static str },

    #[error("Invalid details for {action}: {reason}")]
    #[diagnostic(code(chat_scheduler::dispatch::invalid_details))]
    InvalidDetails { action: Action, reason: String },

    #[error("Refusing to {} in the past", .action.verb())]
    #[diagnostic(code(chat_scheduler::dispatch::past_schedule_time))]
    PastScheduleTime { action: Action },

    #[error("Could not resolve reminder time for {action}: {source}")]
    #[diagnostic(code(chat_scheduler::dispatch::unsupported_time_unit))]
    UnsupportedTimeUnit {
        action: Action,
        #[source]
        source: TimeError,
    },

    #[error("Unparseable timestamp '{value}' for {action}")]
    #[diagnostic(code(chat_scheduler::dispatch::invalid_timestamp))]
    InvalidTimestamp { action: Action, value: String },

    #[error("Adapter failure while {action}: {source}")]
    #[diagnostic(code(chat_scheduler::dispatch::adapter_failure))]
    AdapterFailure {
        action: Action,
        #[source]
        source: Error,
    },
}

impl DispatchError {
    /// The user-facing answer for this failure
    pub fn response(&self) -> String {
        match self {
            DispatchError::MalformedClassifierOutput(_) => {
                "There was an error processing your request.".to_string()
            }
            DispatchError::UnrecognizedIntent(_) => "I did not understand your request.".to_string(),
            DispatchError::MissingRequiredField { action, .. }
            | DispatchError::InvalidDetails { action, .. } => {
                format!("Invalid details provided for {}.", action.gerund())
            }
            DispatchError::PastScheduleTime { action } => {
                format!("Cannot {} in the past.", action.verb())
            }
            DispatchError::UnsupportedTimeUnit { action, .. }
            | DispatchError::InvalidTimestamp { action, .. }
            | DispatchError::AdapterFailure { action, .. } => {
                format!("Error {}.", action.gerund())
            }
        }
    }
}
