use crate::error::{google_calendar_error, BotResult};
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Refresh this many seconds before the token actually expires
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: i64,
}

/// Exchanges the long-lived refresh token for access tokens and caches the
/// current one in memory
#[derive(Clone)]
pub struct TokenManager {
    client_id: String,
    client_secret: String,
    refresh_token: String,
    client: Client,
    cached: Arc<RwLock<Option<AccessToken>>>,
}

impl TokenManager {
    pub fn new(client_id: String, client_secret: String, refresh_token: String, client: Client) -> Self {
        Self {
            client_id,
            client_secret,
            refresh_token,
            client,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Get a valid access token, refreshing it when missing or about to expire
    pub async fn get_token(&self) -> BotResult<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at - EXPIRY_MARGIN_SECS > Utc::now().timestamp() {
                    return Ok(token.value.clone());
                }
            }
        }

        let token = self.refresh().await?;
        let value = token.value.clone();
        *self.cached.write().await = Some(token);
        Ok(value)
    }

    /// Request a new access token with the refresh-token grant
    async fn refresh(&self) -> BotResult<AccessToken> {
        debug!("Refreshing Google access token");

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse token response: {}", e)))?;

        let token = parse_token_response(&body, Utc::now().timestamp())?;
        info!("Obtained Google access token valid until {}", token.expires_at);
        Ok(token)
    }
}

fn parse_token_response(body: &Value, now: i64) -> BotResult<AccessToken> {
    let value = body
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| google_calendar_error("Token response missing 'access_token' field"))?
        .to_string();

    let expires_in = body.get("expires_in").and_then(|v| v.as_i64()).unwrap_or(3600);

    Ok(AccessToken {
        value,
        expires_at: now + expires_in,
    })
}
