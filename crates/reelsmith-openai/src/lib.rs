// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI text generator for Reelsmith.
//!
//! Asks a chat-completions model for YouTube SEO metadata and returns the
//! raw answer; structured extraction happens in the dialogue engine.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{debug, info, warn};

use reelsmith_config::model::OpenAiConfig;
use reelsmith_core::{AdapterType, HealthStatus, PluginAdapter, ReelsmithError, TextGenerator};

use crate::types::{ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse};

/// Builds the user prompt for `topic` in `language`.
pub fn seo_prompt(topic: &str, language: &str) -> String {
    format!(
        "YouTube SEO: topic: {topic}.\n\
         Language: {language}. Return: only in JSON format: title, \
         description (max 1500 characters), tags (10-15)."
    )
}

/// Chat-completions client implementing [`TextGenerator`].
///
/// Retries once after a transient error (429, 500, 503).
#[derive(Debug, Clone)]
pub struct OpenAiTextGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f64,
    max_retries: u32,
}

impl OpenAiTextGenerator {
    pub fn new(config: &OpenAiConfig) -> Result<Self, ReelsmithError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| ReelsmithError::Config("openai.api_key is not set".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| ReelsmithError::Config(format!("invalid OpenAI API key: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReelsmithError::Collaborator {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(model = config.model.as_str(), "OpenAI text generator initialized");

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: 1,
        })
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, ReelsmithError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .json(request)
                .send()
                .await
                .map_err(|e| ReelsmithError::Collaborator {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                let parsed: ChatResponse =
                    response.json().await.map_err(|e| ReelsmithError::Collaborator {
                        message: format!("failed to parse API response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .map(|text| text.trim().to_string())
                    .ok_or_else(|| ReelsmithError::collaborator("completion has no text content"));
            }

            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "OpenAI API error ({}): {}",
                    api_err.error.type_.as_deref().unwrap_or("unknown"),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient error, will retry");
                last_error = Some(ReelsmithError::collaborator(message));
                continue;
            }
            return Err(ReelsmithError::collaborator(message));
        }

        Err(last_error
            .unwrap_or_else(|| ReelsmithError::collaborator("completion failed after retries")))
    }
}

fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[async_trait]
impl PluginAdapter for OpenAiTextGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::TextGenerator
    }

    async fn health_check(&self) -> Result<HealthStatus, ReelsmithError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReelsmithError> {
        Ok(())
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    async fn generate(&self, topic: &str, language: &str) -> Result<String, ReelsmithError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".into(),
                content: seo_prompt(topic, language),
            }],
            temperature: self.temperature,
        };
        self.complete(&request).await
    }
}
