use super::models::{CalendarEvent, NewEvent};
use super::token::TokenManager;
use super::CalendarService;
use crate::config::Config;
use crate::error::{google_calendar_error, BotResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

const API_BASE: &str = "https://www.googleapis.com/calendar/v3/";

/// Calendar API client authenticated with an OAuth refresh token
#[derive(Clone)]
pub struct GoogleCalendarClient {
    calendar_id: String,
    token_manager: TokenManager,
    client: Client,
}

impl GoogleCalendarClient {
    pub fn new(config: &Config) -> Self {
        let client = Client::new();
        let token_manager = TokenManager::new(
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
            config.google_refresh_token.clone(),
            client.clone(),
        );

        Self {
            calendar_id: config.google_calendar_id.clone(),
            token_manager,
            client,
        }
    }

    /// `.../calendars/{calendar_id}/events`
    fn events_url(&self) -> BotResult<Url> {
        let mut url = Url::parse(API_BASE)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API URL cannot be a base"))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }
}

/// Turn a non-success response into an error carrying the body
async fn check_status(response: Response, context: &str) -> BotResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response".to_string());
    Err(google_calendar_error(&format!(
        "{}: HTTP {} - {}",
        context, status, error_body
    )))
}

#[async_trait]
impl CalendarService for GoogleCalendarClient {
    async fn insert_event(&self, event: &NewEvent) -> BotResult<CalendarEvent> {
        let access_token = self.token_manager.get_token().await?;
        let url = self.events_url()?;

        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to create event: {}", e)))?;
        let response = check_status(response, "Failed to create event").await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse event response: {}", e)))?;

        let created = CalendarEvent::from_json(&body);
        info!("Created calendar event {} ({})", created.id, event.summary);
        Ok(created)
    }

    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> BotResult<Vec<CalendarEvent>> {
        let access_token = self.token_manager.get_token().await?;
        let mut url = self.events_url()?;

        url.query_pairs_mut()
            .append_pair("timeMin", &time_min.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("timeMax", &time_max.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        debug!("Listing calendar events between {} and {}", time_min, time_max);

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;
        let response = check_status(response, "Failed to fetch events").await?;

        let response_data: Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse events response: {}", e)))?;

        let events = response_data
            .get("items")
            .and_then(|i| i.as_array())
            .ok_or_else(|| google_calendar_error("No items in response"))?;

        Ok(events.iter().map(CalendarEvent::from_json).collect())
    }
}
