use super::{MessagingService, SentMessage};
use crate::config::Config;
use crate::error::{messaging_error, BotResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::info;

const API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Twilio REST client sending from the configured number
#[derive(Clone)]
pub struct TwilioClient {
    account_sid: String,
    auth_token: String,
    from: String,
    client: Client,
}

impl TwilioClient {
    pub fn new(config: &Config) -> Self {
        Self {
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            from: config.twilio_phone_number.clone(),
            client: Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", API_BASE, self.account_sid)
    }
}

#[async_trait]
impl MessagingService for TwilioClient {
    async fn send_message(&self, to: &str, body: &str) -> BotResult<SentMessage> {
        let params = [("To", to), ("From", self.from.as_str()), ("Body", body)];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| messaging_error(&format!("Failed to send message: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(messaging_error(&format!(
                "Failed to send message: HTTP {} - {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| messaging_error(&format!("Failed to parse message response: {}", e)))?;

        let sent = parse_message_response(&body, to);
        info!("Message {} to {} accepted with status {}", sent.sid, sent.to, sent.status);
        Ok(sent)
    }
}

fn parse_message_response(body: &Value, to: &str) -> SentMessage {
    let text = |key: &str| body.get(key).and_then(|v| v.as_str()).map(|s| s.to_string());

    SentMessage {
        sid: text("sid").unwrap_or_default(),
        to: text("to").unwrap_or_else(|| to.to_string()),
        status: text("status").unwrap_or_else(|| "unknown".to_string()),
    }
}
