use crate::config::ExtractionConfig;
use crate::error::{ApiError, Result};
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

const SYSTEM_PROMPT: &str = "You turn short announcements of student club events into JSON. \
Reply with a single JSON object with the keys clubId, title, startTime, endTime, \
description and location. clubId must be one of the listed club names or null. \
startTime and endTime are local timestamps formatted YYYY-MM-DDTHH:MM:SS. \
Resolve relative dates against the given current date. Use null for anything \
the text does not say.";

/// Everything the extraction service gets to see.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub text: String,
    pub clubs: Vec<String>,
    pub locations: Vec<String>,
    pub today: NaiveDate,
}

impl ExtractionRequest {
    fn user_message(&self) -> String {
        format!(
            "Current date: {}\nKnown clubs: {}\nKnown locations: {}\nText: {}",
            self.today.format("%Y-%m-%d"),
            self.clubs.join("; "),
            self.locations.join("; "),
            self.text
        )
    }
}

/// Unvalidated fields as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExtraction {
    #[serde(default)]
    pub club_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[async_trait]
pub trait EventExtractor: Send + Sync {
    /// Whether calling `extract` can succeed at all.
    fn is_configured(&self) -> bool;

    async fn extract(&self, request: &ExtractionRequest) -> anyhow::Result<RawExtraction>;
}

/// Stand-in used while no API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledExtractor;

#[async_trait]
impl EventExtractor for DisabledExtractor {
    fn is_configured(&self) -> bool {
        false
    }

    async fn extract(&self, _request: &ExtractionRequest) -> anyhow::Result<RawExtraction> {
        bail!("event extraction service is not configured")
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct LlmExtractor {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl LlmExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ApiError::ConfigError("extraction.api_key is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        info!(
            "Event extraction enabled: model {}, timeout {}s",
            config.model, config.timeout_secs
        );

        Ok(Self {
            client,
            api_key,
            endpoint,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl EventExtractor for LlmExtractor {
    fn is_configured(&self) -> bool {
        true
    }

    async fn extract(&self, request: &ExtractionRequest) -> anyhow::Result<RawExtraction> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": request.user_message() },
            ],
        });

        let completion: ChatCompletion = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("extraction request failed")?
            .error_for_status()
            .context("extraction service returned an error status")?
            .json()
            .await
            .context("extraction response is not a chat completion")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("extraction response has no message content"))?;

        debug!("Extraction service replied: {}", content);
        parse_extraction_content(&content)
    }
}

/// Parse the assistant message as the event object. Markdown code fences
/// around the JSON are tolerated.
pub fn parse_extraction_content(content: &str) -> anyhow::Result<RawExtraction> {
    let trimmed = content.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|inner| inner.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(json.trim()).context("extraction content is not an event object")
}
