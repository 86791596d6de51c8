// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Reelsmith engine.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Stable external identity of a chat user (e.g. a Telegram user id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row id of a persisted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub i64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a message delivered by a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
    TextGenerator,
    ImageGenerator,
    VideoHost,
}

// --- Users ---

/// One row per external chat identity. Created lazily, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Whether the upstream video-hosting account has been linked.
    pub connected: bool,
    pub created_at: String,
    pub updated_at: String,
}

// --- Jobs ---

/// Discriminant of a persisted job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Logo,
    Banner,
    Video,
}

/// Lifecycle of a job: `draft -> processing -> {completed | failed}`.
///
/// A draft job may also fail directly. Terminal statuses never change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Returns true for `completed` and `failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true when moving from `self` to `next` keeps the lifecycle monotonic.
    ///
    /// Re-asserting the current non-terminal status is allowed so that payload
    /// and note updates can be written without a status change.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        match (self, next) {
            (Self::Draft, _) => true,
            (Self::Processing, Self::Draft) => false,
            (Self::Processing, _) => true,
            (Self::Completed | Self::Failed, _) => false,
        }
    }
}

/// Kind-specific data collected during the dialogue and derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobPayload {
    /// Logo or banner generation.
    Image {
        description: String,
        style: String,
        prompt: String,
    },
    /// Video upload with the metadata derived from the topic.
    Video {
        topic: String,
        title: Option<String>,
        description: Option<String>,
        tags: Vec<String>,
        file_path: String,
        thumbnail_path: Option<String>,
    },
}

/// A persisted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub user_id: UserId,
    pub kind: JobKind,
    pub status: JobStatus,
    pub payload: JobPayload,
    /// File path, URL or remote id produced by the collaborator.
    pub result: Option<String>,
    /// Failure reason, or a note on a completed job (e.g. thumbnail not attached).
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for [`JobStore::create`](crate::traits::JobStore::create).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub user_id: UserId,
    pub kind: JobKind,
    pub status: JobStatus,
    pub payload: JobPayload,
}

/// Partial update applied atomically to one job row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub payload: Option<JobPayload>,
    pub result: Option<String>,
    pub note: Option<String>,
}

impl JobUpdate {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// A `completed` update carrying the result reference.
    pub fn completed(result: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Completed),
            result: Some(result.into()),
            ..Self::default()
        }
    }

    /// A `failed` update carrying the reason as the note.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            note: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn with_payload(mut self, payload: JobPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Per-status job counts for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounts {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
}

// --- Collaborator contracts ---

/// Terminal outcome of a long-running external operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalResult {
    /// Result reference (URL, remote id, file path).
    Success(String),
    /// Human-readable failure reason.
    Failure(String),
}

impl TerminalResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// A file received from the user or produced locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub size: u64,
}

/// Image aspect ratio requested from the image-generation collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum AspectRatio {
    /// Portrait, used for logos.
    #[strum(serialize = "3:4")]
    #[serde(rename = "3:4")]
    Portrait,
    /// Wide, used for banners.
    #[strum(serialize = "16:9")]
    #[serde(rename = "16:9")]
    Wide,
}

/// A request for one generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub output_format: String,
}

/// Title, description and tags for a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Destination metadata for a video upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Public counters of one video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStats {
    pub title: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

/// Counters of the channel behind the configured YouTube credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub title: String,
    pub subscribers: u64,
    pub views: u64,
    pub videos: u64,
    /// Likes summed over the uploads that were scanned.
    pub likes: u64,
    /// Comments summed over the uploads that were scanned.
    pub comments: u64,
    /// Newest uploads first.
    pub recent: Vec<VideoStats>,
}
