mod twilio;

pub use twilio::TwilioClient;

use crate::error::BotResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Receipt for a message accepted by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentMessage {
    pub sid: String,
    pub to: String,
    pub status: String,
}

/// Sends SMS messages
#[async_trait]
pub trait MessagingService: Send + Sync {
    async fn send_message(&self, to: &str, body: &str) -> BotResult<SentMessage>;
}
