use super::{extract_json_object, IntentClassifier};
use crate::config::Config;
use crate::error::{classifier_error, BotResult};
use async_trait::async_trait;
use rig::completion::{Chat, Message};
use rig::providers::openai::Client as OpenAiClient;
use tracing::{debug, info};

/// Classifier backed by an OpenAI chat model through Rig
#[derive(Clone)]
pub struct OpenAiClassifier {
    client: OpenAiClient,
    model: String,
    max_tokens: u64,
}

impl OpenAiClassifier {
    pub fn new(config: &Config) -> Self {
        info!("Using OpenAI model: {}", config.openai_model);

        Self {
            client: OpenAiClient::new(&config.openai_api_key),
            model: config.openai_model.clone(),
            max_tokens: config.classifier_max_tokens,
        }
    }
}

#[async_trait]
impl IntentClassifier for OpenAiClassifier {
    async fn classify(&self, user_text: &str, system_prompt: &str) -> BotResult<String> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(system_prompt)
            .max_tokens(self.max_tokens)
            .temperature(0.0)
            .build();

        let response = agent
            .chat(user_text.to_string(), Vec::<Message>::new())
            .await
            .map_err(|e| classifier_error(&format!("OpenAI request failed: {}", e)))?;

        let content = extract_json_object(&response);
        if content.is_empty() {
            return Err(classifier_error("OpenAI returned an empty answer"));
        }

        debug!("Classifier answer: {}", content);
        Ok(content.to_string())
    }
}
