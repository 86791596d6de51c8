// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contracts of the external systems the engine drives.

use std::path::Path;

use async_trait::async_trait;

use crate::error::ReelsmithError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Artifact, ChannelStats, ImageRequest, TerminalResult, VideoMetadata};

/// LLM text generation used for SEO metadata.
#[async_trait]
pub trait TextGenerator: PluginAdapter {
    /// Returns the raw model output for `topic` in `language`.
    ///
    /// The output is expected to contain a JSON object with `title`,
    /// `description` and `tags`, but callers must tolerate free text.
    async fn generate(&self, topic: &str, language: &str) -> Result<String, ReelsmithError>;
}

/// Asynchronous image generation.
///
/// Never returns an error: transport and API failures are folded into
/// [`TerminalResult::Failure`].
#[async_trait]
pub trait ImageGenerator: PluginAdapter {
    async fn generate(&self, request: ImageRequest) -> TerminalResult;
}

/// Video hosting with resumable upload.
#[async_trait]
pub trait VideoHost: PluginAdapter {
    /// Uploads `video` and returns the remote video id on success.
    async fn upload(&self, video: &Artifact, metadata: &VideoMetadata) -> TerminalResult;

    /// Attaches a thumbnail to an uploaded video.
    async fn attach_thumbnail(
        &self,
        video_id: &str,
        thumbnail: &Artifact,
    ) -> Result<(), ReelsmithError>;

    /// Counters of the channel the uploads go to.
    async fn channel_stats(&self) -> Result<ChannelStats, ReelsmithError>;
}

/// Produces a thumbnail image for a video title.
#[async_trait]
pub trait ThumbnailRenderer: Send + Sync {
    async fn render(&self, title: &str, dest_dir: &Path) -> Result<Artifact, ReelsmithError>;
}
