use crate::error::{config_error, env_error, BotResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Default OpenAI model used for intent classification
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Default token limit for a classifier answer
pub const DEFAULT_CLASSIFIER_MAX_TOKENS: u64 = 150;

/// Placeholder recipient for reminders until users carry their own number
pub const DEFAULT_RECIPIENT: &str = "+1234567890";

/// Default timezone for created events and local timestamps
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

/// Default address for the HTTP server
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Optional overrides file
pub const OVERRIDES_PATH: &str = "config/chat_scheduler.toml";

/// Main configuration structure for the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenAI API key for the classifier
    pub openai_api_key: String,
    /// OpenAI model name
    pub openai_model: String,
    /// Token limit for the classifier answer
    pub classifier_max_tokens: u64,
    /// Google Calendar API client ID
    pub google_client_id: String,
    /// Google Calendar API client secret
    pub google_client_secret: String,
    /// Long-lived OAuth refresh token
    pub google_refresh_token: String,
    /// Google Calendar ID to write to and read from
    pub google_calendar_id: String,
    /// Twilio account SID
    pub twilio_account_sid: String,
    /// Twilio auth token
    pub twilio_auth_token: String,
    /// Twilio sender number
    pub twilio_phone_number: String,
    /// Number that receives scheduled reminders
    pub default_recipient: String,
    /// Timezone for events and local timestamps
    pub timezone: String,
    /// Address the HTTP server listens on
    pub bind_address: String,
}

/// Values the overrides file may replace
#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    openai_model: Option<String>,
    classifier_max_tokens: Option<u64>,
    google_calendar_id: Option<String>,
    default_recipient: Option<String>,
    timezone: Option<String>,
    bind_address: Option<String>,
}

/// Read a required environment variable
fn required(var: &str) -> BotResult<String> {
    env::var(var).map_err(|_| env_error(var))
}

/// Read an optional environment variable with a default
fn optional(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let classifier_max_tokens = match env::var("CLASSIFIER_MAX_TOKENS") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| config_error("Invalid CLASSIFIER_MAX_TOKENS format"))?,
            Err(_) => DEFAULT_CLASSIFIER_MAX_TOKENS,
        };

        let mut config = Config {
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_model: optional("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            classifier_max_tokens,
            google_client_id: required("GOOGLE_CLIENT_ID")?,
            google_client_secret: required("GOOGLE_CLIENT_SECRET")?,
            google_refresh_token: required("GOOGLE_REFRESH_TOKEN")?,
            google_calendar_id: optional("GOOGLE_CALENDAR_ID", "primary"),
            twilio_account_sid: required("TWILIO_ACCOUNT_SID")?,
            twilio_auth_token: required("TWILIO_AUTH_TOKEN")?,
            twilio_phone_number: required("TWILIO_PHONE_NUMBER")?,
            default_recipient: optional("DEFAULT_REMINDER_RECIPIENT", DEFAULT_RECIPIENT),
            timezone: optional("TIMEZONE", DEFAULT_TIMEZONE),
            bind_address: optional("BIND_ADDRESS", DEFAULT_BIND_ADDRESS),
        };

        if Path::new(OVERRIDES_PATH).exists() {
            let content = fs::read_to_string(OVERRIDES_PATH)?;
            config.apply_overrides(&content)?;
        }

        // Fail early on a bad timezone name
        config.tz()?;

        Ok(config)
    }

    /// Merge a TOML overrides document into this config
    pub fn apply_overrides(&mut self, content: &str) -> BotResult<()> {
        let overrides: ConfigOverrides = toml::from_str(content)?;

        if let Some(model) = overrides.openai_model {
            self.openai_model = model;
        }
        if let Some(max_tokens) = overrides.classifier_max_tokens {
            self.classifier_max_tokens = max_tokens;
        }
        if let Some(calendar_id) = overrides.google_calendar_id {
            self.google_calendar_id = calendar_id;
        }
        if let Some(recipient) = overrides.default_recipient {
            self.default_recipient = recipient;
        }
        if let Some(timezone) = overrides.timezone {
            self.timezone = timezone;
        }
        if let Some(bind_address) = overrides.bind_address {
            self.bind_address = bind_address;
        }

        Ok(())
    }

    /// Parsed timezone
    pub fn tz(&self) -> BotResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", self.timezone)))
    }

    /// Whether reminders still go to the placeholder number
    pub fn uses_placeholder_recipient(&self) -> bool {
        self.default_recipient == DEFAULT_RECIPIENT
    }
}
