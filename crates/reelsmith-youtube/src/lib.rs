// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! YouTube video host for Reelsmith.
//!
//! Uploads go through the resumable protocol in [`upload`]; thumbnails are
//! rendered locally by [`thumbnail::PlateRenderer`] and attached afterwards.
//! Channel counters for `/statistics` come from [`stats`].

pub mod stats;
pub mod thumbnail;
pub mod upload;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, info, warn};

use reelsmith_config::model::YoutubeConfig;
use reelsmith_core::types::VideoMetadata;
use reelsmith_core::{
    AdapterType, Artifact, ChannelStats, HealthStatus, PluginAdapter, ReelsmithError,
    TerminalResult, VideoHost,
};

pub use thumbnail::PlateRenderer;
pub use upload::{PrivacyStatus, ResumableUploader, Snippet, VideoResource};

pub struct YoutubeHost {
    client: reqwest::Client,
    api_base_url: String,
    upload_base_url: String,
    uploader: ResumableUploader,
    category_id: String,
    privacy_status: String,
}

impl YoutubeHost {
    pub fn new(config: &YoutubeConfig) -> Result<Self, ReelsmithError> {
        let token = config
            .access_token
            .as_deref()
            .ok_or_else(|| ReelsmithError::Config("youtube.access_token is not set".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ReelsmithError::Config(format!("invalid YouTube access token: {e}")))?,
        );

        // 308 is the resumable protocol's "incomplete" answer, not a redirect.
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| ReelsmithError::Collaborator {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let uploader = ResumableUploader::new(
            client.clone(),
            &config.upload_base_url,
            config.chunk_size_bytes,
            config.max_chunk_retries,
        );

        info!(
            chunk_size = config.chunk_size_bytes,
            privacy = config.privacy_status.as_str(),
            "YouTube host initialized"
        );

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            upload_base_url: config.upload_base_url.trim_end_matches('/').to_string(),
            uploader,
            category_id: config.category_id.clone(),
            privacy_status: config.privacy_status.clone(),
        })
    }

    /// Replaces the chunk retry delay. Tests use a zero delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.uploader = self.uploader.with_retry_delay(delay);
        self
    }

    fn resource(&self, metadata: &VideoMetadata) -> VideoResource {
        VideoResource {
            snippet: Snippet {
                title: metadata.title.clone(),
                description: metadata.description.clone(),
                tags: metadata.tags.clone(),
                category_id: self.category_id.clone(),
            },
            status: PrivacyStatus {
                privacy_status: self.privacy_status.clone(),
            },
        }
    }
}

#[async_trait]
impl PluginAdapter for YoutubeHost {
    fn name(&self) -> &str {
        "youtube"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VideoHost
    }

    /// Checks that the token still resolves the caller's channel.
    async fn health_check(&self) -> Result<HealthStatus, ReelsmithError> {
        let response = self
            .client
            .get(format!("{}/channels?part=id&mine=true", self.api_base_url))
            .send()
            .await;
        Ok(match response {
            Ok(r) if r.status().is_success() => HealthStatus::Healthy,
            Ok(r) => HealthStatus::Degraded(format!("channel lookup returned {}", r.status())),
            Err(e) => HealthStatus::Unhealthy(format!("channel lookup failed: {e}")),
        })
    }

    async fn shutdown(&self) -> Result<(), ReelsmithError> {
        Ok(())
    }
}

#[async_trait]
impl VideoHost for YoutubeHost {
    async fn upload(&self, video: &Artifact, metadata: &VideoMetadata) -> TerminalResult {
        match self.uploader.upload(video, &self.resource(metadata)).await {
            Ok(video_id) => TerminalResult::Success(video_id),
            Err(e) => {
                warn!(error = %e, "video upload failed");
                TerminalResult::Failure(e.to_string())
            }
        }
    }

    async fn attach_thumbnail(
        &self,
        video_id: &str,
        thumbnail: &Artifact,
    ) -> Result<(), ReelsmithError> {
        let bytes = tokio::fs::read(&thumbnail.path)
            .await
            .map_err(ReelsmithError::storage)?;
        let response = self
            .client
            .post(format!(
                "{}/thumbnails/set?videoId={video_id}",
                self.upload_base_url
            ))
            .header(CONTENT_TYPE, upload::image_content_type(&thumbnail.path))
            .body(bytes)
            .send()
            .await
            .map_err(|e| ReelsmithError::Collaborator {
                message: format!("thumbnail request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReelsmithError::collaborator(format!(
                "thumbnail upload returned {status}: {body}"
            )));
        }
        debug!(video_id, "thumbnail attached");
        Ok(())
    }

    async fn channel_stats(&self) -> Result<ChannelStats, ReelsmithError> {
        stats::fetch(&self.client, &self.api_base_url).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn host(server: &MockServer) -> YoutubeHost {
        YoutubeHost::new(&YoutubeConfig {
            access_token: Some("ya29.test".into()),
            api_base_url: server.uri(),
            upload_base_url: server.uri(),
            chunk_size_bytes: 256 * 1024,
            ..YoutubeConfig::default()
        })
        .unwrap()
        .with_retry_delay(Duration::ZERO)
    }

    fn artifact(dir: &tempfile::TempDir, name: &str, size: usize) -> Artifact {
        let path = dir.path().join(name);
        std::fs::write(&path, vec![1u8; size]).unwrap();
        Artifact {
            path,
            file_name: Some(name.into()),
            mime_type: None,
            size: size as u64,
        }
    }

    fn metadata() -> VideoMetadata {
        VideoMetadata {
            title: "Intro to sorting algorithms".into(),
            description: "Learn sorting.\n\n#sorting #algorithms".into(),
            tags: vec!["sorting".into(), "algorithms".into()],
        }
    }

    #[tokio::test]
    async fn upload_sends_metadata_and_returns_video_id() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        Mock::given(method("POST"))
            .and(path("/videos"))
            .and(header("authorization", "Bearer ya29.test"))
            .and(body_partial_json(serde_json::json!({
                "snippet": {
                    "title": "Intro to sorting algorithms",
                    "tags": ["sorting", "algorithms"],
                    "categoryId": "22"
                },
                "status": {"privacyStatus": "public"}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("location", format!("{}/session/up", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/session/up"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "abc123"})))
            .mount(&server)
            .await;

        let result = host(&server)
            .upload(&artifact(&dir, "clip.mp4", 1000), &metadata())
            .await;
        assert_eq!(result, TerminalResult::Success("abc123".into()));
    }

    #[tokio::test]
    async fn upload_failure_is_a_terminal_failure() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        Mock::given(method("POST"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let result = host(&server)
            .upload(&artifact(&dir, "clip.mp4", 10), &metadata())
            .await;
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn attach_thumbnail_posts_jpeg_bytes() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        Mock::given(method("POST"))
            .and(path("/thumbnails/set"))
            .and(query_param("videoId", "abc123"))
            .and(header("content-type", "image/jpeg"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;

        host(&server)
            .attach_thumbnail("abc123", &artifact(&dir, "thumb.jpg", 64))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_thumbnail_is_an_error() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        Mock::given(method("POST"))
            .and(path("/thumbnails/set"))
            .respond_with(ResponseTemplate::new(403).set_body_string("channel not verified"))
            .mount(&server)
            .await;

        let err = host(&server)
            .attach_thumbnail("abc123", &artifact(&dir, "thumb.jpg", 64))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("channel not verified"), "got: {err}");
    }

    #[tokio::test]
    async fn health_check_reports_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let status = host(&server).health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Degraded(_)));
    }

    #[tokio::test]
    async fn channel_stats_use_the_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels"))
            .and(query_param("part", "snippet,statistics,contentDetails"))
            .and(header("authorization", "Bearer ya29.test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{
                    "snippet": {"title": "Code With Ann"},
                    "statistics": {"subscriberCount": "12", "viewCount": "900", "videoCount": "0"}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let stats = host(&server).channel_stats().await.unwrap();
        assert_eq!(stats.title, "Code With Ann");
        assert_eq!(stats.subscribers, 12);
        assert_eq!(stats.views, 900);
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let err = YoutubeHost::new(&YoutubeConfig::default()).err().unwrap();
        assert!(matches!(err, ReelsmithError::Config(_)));
    }
}
