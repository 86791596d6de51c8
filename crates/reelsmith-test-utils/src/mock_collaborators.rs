// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted stand-ins for the text, image, video and thumbnail collaborators.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use reelsmith_core::types::{ImageRequest, VideoMetadata};
use reelsmith_core::{
    AdapterType, Artifact, ChannelStats, HealthStatus, ImageGenerator, PluginAdapter,
    ReelsmithError, TerminalResult, TextGenerator, ThumbnailRenderer, VideoHost,
};

macro_rules! plugin_adapter {
    ($ty:ty, $name:literal, $kind:expr) => {
        #[async_trait]
        impl PluginAdapter for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn version(&self) -> semver::Version {
                semver::Version::new(0, 1, 0)
            }

            fn adapter_type(&self) -> AdapterType {
                $kind
            }

            async fn health_check(&self) -> Result<HealthStatus, ReelsmithError> {
                Ok(HealthStatus::Healthy)
            }

            async fn shutdown(&self) -> Result<(), ReelsmithError> {
                Ok(())
            }
        }
    };
}

/// Lets a test hold a collaborator call open.
///
/// The collaborator signals `entered` when the call starts and waits for
/// `release` before answering.
#[derive(Debug, Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

// --- Text ---

/// Returns queued responses in order; when the queue is empty, echoes a
/// well-formed JSON answer for the topic.
#[derive(Default)]
pub struct MockTextGenerator {
    responses: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_response(&self, raw: impl Into<String>) {
        self.responses.lock().await.push_back(Ok(raw.into()));
    }

    /// The next call fails with a collaborator error carrying `message`.
    pub async fn push_error(&self, message: impl Into<String>) {
        self.responses.lock().await.push_back(Err(message.into()));
    }

    /// `(topic, language)` of every call.
    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().await.clone()
    }
}

plugin_adapter!(MockTextGenerator, "mock-text", AdapterType::TextGenerator);

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, topic: &str, language: &str) -> Result<String, ReelsmithError> {
        self.calls
            .lock()
            .await
            .push((topic.to_string(), language.to_string()));
        match self.responses.lock().await.pop_front() {
            Some(Ok(raw)) => Ok(raw),
            Some(Err(message)) => Err(ReelsmithError::collaborator(message)),
            None => Ok(format!(
                r#"{{"title": "{topic}", "description": "About {topic}", "tags": ["{topic}"]}}"#
            )),
        }
    }
}

// --- Images ---

pub struct MockImageGenerator {
    outcome: Mutex<TerminalResult>,
    requests: Mutex<Vec<ImageRequest>>,
    gate: Option<Arc<Gate>>,
}

impl MockImageGenerator {
    pub fn new(outcome: TerminalResult) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Like [`new`](Self::new), but each call waits on the returned gate.
    pub fn gated(outcome: TerminalResult) -> (Self, Arc<Gate>) {
        let gate = Arc::new(Gate::default());
        let generator = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::new(outcome)
        };
        (generator, gate)
    }

    pub async fn set_outcome(&self, outcome: TerminalResult) {
        *self.outcome.lock().await = outcome;
    }

    pub async fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockImageGenerator {
    fn default() -> Self {
        Self::new(TerminalResult::Success(
            "https://images.example/generated.png".into(),
        ))
    }
}

plugin_adapter!(MockImageGenerator, "mock-images", AdapterType::ImageGenerator);

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(&self, request: ImageRequest) -> TerminalResult {
        self.requests.lock().await.push(request);
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        self.outcome.lock().await.clone()
    }
}

// --- Video host ---

pub struct MockVideoHost {
    outcome: Mutex<TerminalResult>,
    attach_error: Mutex<Option<String>>,
    stats: Mutex<Result<ChannelStats, String>>,
    uploads: Mutex<Vec<(Artifact, VideoMetadata)>>,
    thumbnails: Mutex<Vec<(String, Artifact)>>,
}

impl MockVideoHost {
    pub fn new(outcome: TerminalResult) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            attach_error: Mutex::new(None),
            stats: Mutex::new(Ok(ChannelStats {
                title: "Mock Channel".into(),
                subscribers: 10,
                views: 100,
                videos: 1,
                ..ChannelStats::default()
            })),
            uploads: Mutex::new(Vec::new()),
            thumbnails: Mutex::new(Vec::new()),
        }
    }

    pub async fn set_outcome(&self, outcome: TerminalResult) {
        *self.outcome.lock().await = outcome;
    }

    /// Makes `attach_thumbnail` fail with `message`.
    pub async fn fail_attach(&self, message: impl Into<String>) {
        *self.attach_error.lock().await = Some(message.into());
    }

    /// Sets what `channel_stats` answers; `Err` carries the error message.
    pub async fn set_stats(&self, stats: Result<ChannelStats, String>) {
        *self.stats.lock().await = stats;
    }

    pub async fn uploads(&self) -> Vec<(Artifact, VideoMetadata)> {
        self.uploads.lock().await.clone()
    }

    /// `(video_id, thumbnail)` of every successful attach.
    pub async fn thumbnails(&self) -> Vec<(String, Artifact)> {
        self.thumbnails.lock().await.clone()
    }
}

impl Default for MockVideoHost {
    fn default() -> Self {
        Self::new(TerminalResult::Success("abc123".into()))
    }
}

plugin_adapter!(MockVideoHost, "mock-video-host", AdapterType::VideoHost);

#[async_trait]
impl VideoHost for MockVideoHost {
    async fn upload(&self, video: &Artifact, metadata: &VideoMetadata) -> TerminalResult {
        self.uploads
            .lock()
            .await
            .push((video.clone(), metadata.clone()));
        self.outcome.lock().await.clone()
    }

    async fn attach_thumbnail(
        &self,
        video_id: &str,
        thumbnail: &Artifact,
    ) -> Result<(), ReelsmithError> {
        if let Some(message) = self.attach_error.lock().await.clone() {
            return Err(ReelsmithError::collaborator(message));
        }
        self.thumbnails
            .lock()
            .await
            .push((video_id.to_string(), thumbnail.clone()));
        Ok(())
    }

    async fn channel_stats(&self) -> Result<ChannelStats, ReelsmithError> {
        self.stats
            .lock()
            .await
            .clone()
            .map_err(ReelsmithError::collaborator)
    }
}

// --- Thumbnails ---

/// Writes a small placeholder file under `dest_dir` for each render.
#[derive(Default)]
pub struct MockThumbnailRenderer {
    fail: bool,
    titles: Mutex<Vec<String>>,
}

impl MockThumbnailRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn titles(&self) -> Vec<String> {
        self.titles.lock().await.clone()
    }
}

#[async_trait]
impl ThumbnailRenderer for MockThumbnailRenderer {
    async fn render(&self, title: &str, dest_dir: &Path) -> Result<Artifact, ReelsmithError> {
        self.titles.lock().await.push(title.to_string());
        if self.fail {
            return Err(ReelsmithError::Internal("thumbnail renderer unavailable".into()));
        }
        let file_name = format!("thumbnail-{}.jpg", uuid::Uuid::new_v4());
        let path = dest_dir.join(&file_name);
        let bytes = [0xFFu8, 0xD8, 0xFF, 0xD9];
        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(ReelsmithError::storage)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(ReelsmithError::storage)?;
        Ok(Artifact {
            path,
            file_name: Some(file_name),
            mime_type: Some("image/jpeg".into()),
            size: bytes.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use reelsmith_core::types::AspectRatio;

    use super::*;

    #[tokio::test]
    async fn text_generator_replays_script_then_echoes() {
        let text = MockTextGenerator::new();
        text.push_response("not json").await;
        text.push_error("rate limited").await;

        assert_eq!(text.generate("t", "en").await.unwrap(), "not json");
        assert!(text.generate("t", "en").await.is_err());
        assert!(text.generate("t", "en").await.unwrap().contains("\"title\": \"t\""));
        assert_eq!(text.calls().await.len(), 3);
    }

    #[tokio::test]
    async fn gated_image_generator_waits_for_release() {
        let (images, gate) = MockImageGenerator::gated(TerminalResult::Success("u".into()));
        let images = Arc::new(images);
        let call = {
            let images = Arc::clone(&images);
            tokio::spawn(async move {
                images
                    .generate(ImageRequest {
                        prompt: "p".into(),
                        aspect_ratio: AspectRatio::Wide,
                        output_format: "png".into(),
                    })
                    .await
            })
        };
        gate.entered.notified().await;
        assert!(!call.is_finished());
        gate.release.notify_one();
        assert_eq!(call.await.unwrap(), TerminalResult::Success("u".into()));
    }
}
