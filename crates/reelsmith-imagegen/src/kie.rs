// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the KIE GPT-4o image task API.
//!
//! `POST /api/v1/gpt4o-image/generate` starts a task and returns
//! `data.taskId`; `GET /api/v1/gpt4o-image/record-info?taskId=...` reports
//! `data.status` and, once finished, `data.response.resultUrls`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use reelsmith_config::model::ImageGenConfig;
use reelsmith_core::ReelsmithError;
use reelsmith_core::types::ImageRequest;

use crate::poller::{TaskEndpoint, TaskStatus};

const GENERATE_PATH: &str = "/api/v1/gpt4o-image/generate";
const RECORD_INFO_PATH: &str = "/api/v1/gpt4o-image/record-info";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody<'a> {
    prompt: &'a str,
    enable_translation: bool,
    aspect_ratio: String,
    output_format: &'a str,
    model: &'a str,
}

/// Common envelope: `{ "code": 200, "msg": "success", "data": { ... } }`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateData {
    task_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordInfo {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    response: Option<RecordResponse>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordResponse {
    #[serde(default)]
    result_urls: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct KieClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    enable_translation: bool,
}

impl KieClient {
    pub fn new(config: &ImageGenConfig) -> Result<Self, ReelsmithError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| ReelsmithError::Config("imagegen.api_key is not set".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| ReelsmithError::Config(format!("invalid imagegen API key: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ReelsmithError::Collaborator {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            enable_translation: config.enable_translation,
        })
    }

    async fn read_envelope<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, ReelsmithError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| ReelsmithError::Collaborator {
            message: format!("failed to read {what} response: {e}"),
            source: Some(Box::new(e)),
        })?;
        if !status.is_success() {
            return Err(ReelsmithError::collaborator(format!(
                "{what} returned {status}: {body}"
            )));
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| ReelsmithError::Collaborator {
                message: format!("failed to parse {what} response: {e}"),
                source: Some(Box::new(e)),
            })?;
        if let Some(code) = envelope.code
            && code != 200
        {
            return Err(ReelsmithError::collaborator(format!(
                "{what} rejected ({code}): {}",
                envelope.msg.unwrap_or_default()
            )));
        }
        envelope
            .data
            .ok_or_else(|| ReelsmithError::collaborator(format!("{what} response has no data")))
    }
}

fn transport_error(what: &str, e: reqwest::Error) -> ReelsmithError {
    ReelsmithError::Collaborator {
        message: format!("{what} request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl TaskEndpoint for KieClient {
    type Request = ImageRequest;

    async fn submit(&self, request: &ImageRequest) -> Result<String, ReelsmithError> {
        let body = GenerateBody {
            prompt: &request.prompt,
            enable_translation: self.enable_translation,
            aspect_ratio: request.aspect_ratio.to_string(),
            output_format: &request.output_format,
            model: &self.model,
        };
        let response = self
            .client
            .post(format!("{}{GENERATE_PATH}", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("generate", e))?;

        let data: GenerateData = Self::read_envelope(response, "generate").await?;
        debug!(task_id = data.task_id.as_str(), "image task accepted");
        Ok(data.task_id)
    }

    async fn status(&self, task_id: &str) -> Result<TaskStatus, ReelsmithError> {
        let response = self
            .client
            .get(format!("{}{RECORD_INFO_PATH}?taskId={task_id}", self.base_url))
            .send()
            .await
            .map_err(|e| transport_error("record-info", e))?;

        let info: RecordInfo = Self::read_envelope(response, "record-info").await?;
        Ok(match info.status.as_deref() {
            Some("SUCCESS") => TaskStatus::Succeeded(
                info.response.unwrap_or_default().result_urls,
            ),
            Some(failed @ ("GENERATE_FAILED" | "CREATE_TASK_FAILED")) => {
                TaskStatus::Failed(match info.error_message {
                    Some(message) if !message.is_empty() => format!("{failed}: {message}"),
                    _ => failed.to_string(),
                })
            }
            _ => TaskStatus::Pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use reelsmith_core::types::AspectRatio;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(base_url: &str) -> KieClient {
        KieClient::new(&ImageGenConfig {
            api_key: Some("kie-test".into()),
            base_url: base_url.to_string(),
            ..ImageGenConfig::default()
        })
        .unwrap()
    }

    fn request() -> ImageRequest {
        ImageRequest {
            prompt: "Theme: Programming".into(),
            aspect_ratio: AspectRatio::Portrait,
            output_format: "png".into(),
        }
    }

    #[tokio::test]
    async fn submit_sends_camel_case_body_and_bearer_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("authorization", "Bearer kie-test"))
            .and(body_partial_json(serde_json::json!({
                "prompt": "Theme: Programming",
                "enableTranslation": true,
                "aspectRatio": "3:4",
                "outputFormat": "png",
                "model": "gpt4o-image"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 200, "msg": "success", "data": {"taskId": "t-42"}
            })))
            .mount(&server)
            .await;

        let task_id = client(&server.uri()).submit(&request()).await.unwrap();
        assert_eq!(task_id, "t-42");
    }

    #[tokio::test]
    async fn submit_rejects_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 402, "msg": "insufficient credits", "data": null
            })))
            .mount(&server)
            .await;

        let err = client(&server.uri()).submit(&request()).await.unwrap_err();
        assert!(err.to_string().contains("insufficient credits"), "got: {err}");
    }

    #[tokio::test]
    async fn status_maps_remote_states() {
        let server = MockServer::start().await;
        let cases = [
            ("t-run", serde_json::json!({"status": "GENERATING"}), TaskStatus::Pending),
            (
                "t-ok",
                serde_json::json!({"status": "SUCCESS", "response": {"resultUrls": ["https://cdn/x.png"]}}),
                TaskStatus::Succeeded(vec!["https://cdn/x.png".into()]),
            ),
            (
                "t-bad",
                serde_json::json!({"status": "GENERATE_FAILED", "errorMessage": "content policy"}),
                TaskStatus::Failed("GENERATE_FAILED: content policy".into()),
            ),
        ];
        for (task_id, data, _) in &cases {
            Mock::given(method("GET"))
                .and(path(RECORD_INFO_PATH))
                .and(query_param("taskId", *task_id))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "code": 200, "msg": "success", "data": data
                })))
                .mount(&server)
                .await;
        }

        let client = client(&server.uri());
        for (task_id, _, expected) in cases {
            assert_eq!(client.status(task_id).await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn http_error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RECORD_INFO_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).status("t-1").await.unwrap_err();
        assert!(err.to_string().contains("500"), "got: {err}");
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let err = KieClient::new(&ImageGenConfig::default()).unwrap_err();
        assert!(matches!(err, ReelsmithError::Config(_)));
    }
}
