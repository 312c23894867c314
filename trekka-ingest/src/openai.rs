use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use trekka_core::TripCandidate;
use trekka_shared::Masked;

use crate::email::truncate_chars;
use crate::extractor::{parse_candidate, ExtractionError, TripExtractor};
use crate::prompt::{build_prompt, SYSTEM_PROMPT};

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub api_key: Masked<String>,
    pub model: String,
    pub temperature: f32,
    pub prompt_body_limit: usize,
    pub timeout: Duration,
}

/// Extractor backed by any OpenAI-compatible chat-completion endpoint.
/// One request per email, no retries.
pub struct OpenAiExtractor {
    client: reqwest::Client,
    endpoint: String,
    config: OpenAiConfig,
}

impl OpenAiExtractor {
    pub fn new(config: OpenAiConfig) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExtractionError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            config,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl TripExtractor for OpenAiExtractor {
    async fn extract(&self, subject: &str, body: &str) -> Result<TripCandidate, ExtractionError> {
        let prompt = build_prompt(subject, body, self.config.prompt_body_limit);
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &prompt },
            ],
            temperature: self.config.temperature,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.config.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Extraction provider returned {}", status);
            return Err(ExtractionError::Provider {
                status: status.as_u16(),
                message: truncate_chars(&body, 200).to_string(),
            });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::Malformed(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ExtractionError::Malformed("completion has no content".to_string()))?;

        debug!("Extraction provider answered with {} characters", content.len());
        parse_candidate(&content)
    }
}
