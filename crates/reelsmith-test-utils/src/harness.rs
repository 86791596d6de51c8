// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end dialogue tests.
//!
//! `TestHarness` wires an [`Orchestrator`] to a temp SQLite store and mock
//! collaborators, and exposes `send()` to drive it one event at a time.

use std::path::PathBuf;
use std::sync::Arc;

use reelsmith_config::model::StorageConfig;
use reelsmith_core::{
    Artifact, ConversationState, ConversationStore, Effect, Event, Job, JobId, JobStore,
    ReelsmithError, StorageAdapter, TerminalResult, UserId,
};
use reelsmith_dialogue::{Collaborators, Orchestrator, OrchestratorSettings};
use reelsmith_storage::SqliteStorage;

use crate::faulty_store::FaultyJobStore;
use crate::mock_collaborators::{
    Gate, MockImageGenerator, MockTextGenerator, MockThumbnailRenderer, MockVideoHost,
};

/// Builder for creating test environments with configurable collaborators.
pub struct TestHarnessBuilder {
    image_outcome: TerminalResult,
    video_outcome: TerminalResult,
    gated_images: bool,
    failing_thumbnails: bool,
    attach_thumbnails: bool,
    youtube_linked: bool,
    language: String,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            image_outcome: TerminalResult::Success("https://images.example/generated.png".into()),
            video_outcome: TerminalResult::Success("abc123".into()),
            gated_images: false,
            failing_thumbnails: false,
            attach_thumbnails: true,
            youtube_linked: false,
            language: "en".into(),
        }
    }

    pub fn with_image_outcome(mut self, outcome: TerminalResult) -> Self {
        self.image_outcome = outcome;
        self
    }

    pub fn with_video_outcome(mut self, outcome: TerminalResult) -> Self {
        self.video_outcome = outcome;
        self
    }

    /// Image generation waits on [`TestHarness::gate`] before answering.
    pub fn with_gated_images(mut self) -> Self {
        self.gated_images = true;
        self
    }

    pub fn with_failing_thumbnails(mut self) -> Self {
        self.failing_thumbnails = true;
        self
    }

    /// Uploads keep YouTube's own thumbnail.
    pub fn without_thumbnails(mut self) -> Self {
        self.attach_thumbnails = false;
        self
    }

    /// Users see their YouTube account as linked.
    pub fn with_linked_youtube(mut self) -> Self {
        self.youtube_linked = true;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub async fn build(self) -> Result<TestHarness, ReelsmithError> {
        let temp_dir = tempfile::TempDir::new().map_err(ReelsmithError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
            ..StorageConfig::default()
        });
        storage.initialize().await?;
        let storage = Arc::new(storage);

        let jobs = Arc::new(FaultyJobStore::new(storage.clone() as Arc<dyn JobStore>));
        let text = Arc::new(MockTextGenerator::new());
        let (images, gate) = if self.gated_images {
            let (images, gate) = MockImageGenerator::gated(self.image_outcome);
            (Arc::new(images), Some(gate))
        } else {
            (Arc::new(MockImageGenerator::new(self.image_outcome)), None)
        };
        let videos = Arc::new(MockVideoHost::new(self.video_outcome));
        let thumbnails = Arc::new(if self.failing_thumbnails {
            MockThumbnailRenderer::failing()
        } else {
            MockThumbnailRenderer::new()
        });

        let work_dir = temp_dir.path().join("work");
        let collaborators = Collaborators {
            jobs: jobs.clone(),
            conversations: storage.clone(),
            text: text.clone(),
            images: images.clone(),
            videos: videos.clone(),
            thumbnails: thumbnails.clone(),
        };
        let settings = OrchestratorSettings {
            language: self.language,
            work_dir: work_dir.clone(),
            youtube_linked: self.youtube_linked,
            attach_thumbnails: self.attach_thumbnails,
        };
        let orchestrator = Arc::new(Orchestrator::new(collaborators, settings));

        Ok(TestHarness {
            orchestrator,
            storage,
            jobs,
            text,
            images,
            videos,
            thumbnails,
            gate,
            work_dir,
            temp_dir,
        })
    }
}

/// A complete dialogue environment with mock collaborators and temp storage.
pub struct TestHarness {
    pub orchestrator: Arc<Orchestrator>,
    /// SQLite storage (temp DB, removed on drop).
    pub storage: Arc<SqliteStorage>,
    /// The job store the orchestrator writes through; can inject failures.
    pub jobs: Arc<FaultyJobStore>,
    pub text: Arc<MockTextGenerator>,
    pub images: Arc<MockImageGenerator>,
    pub videos: Arc<MockVideoHost>,
    pub thumbnails: Arc<MockThumbnailRenderer>,
    /// Present when built with `with_gated_images()`.
    pub gate: Option<Arc<Gate>>,
    pub work_dir: PathBuf,
    temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default collaborators: images and uploads succeed.
    pub async fn new() -> Result<Self, ReelsmithError> {
        Self::builder().build().await
    }

    /// Feeds one event from `user` to the orchestrator.
    pub async fn send(&self, user: &str, event: Event) -> Effect {
        self.orchestrator.handle(&UserId(user.to_string()), event).await
    }

    /// Feeds events in order and returns the last effect.
    pub async fn send_all(&self, user: &str, events: Vec<Event>) -> Effect {
        let mut last = Effect::Ignored;
        for event in events {
            last = self.send(user, event).await;
        }
        last
    }

    pub async fn state(&self, user: &str) -> Result<ConversationState, ReelsmithError> {
        self.storage.load(&UserId(user.to_string())).await
    }

    pub async fn job(&self, job_id: JobId) -> Result<Option<Job>, ReelsmithError> {
        self.storage.get_job(job_id).await
    }

    /// All jobs of `user`, newest first.
    pub async fn jobs_of(&self, user: &str) -> Result<Vec<Job>, ReelsmithError> {
        self.storage.list_jobs(&UserId(user.to_string()), 100).await
    }

    /// Writes a small fake video file and returns it as an artifact.
    pub fn video_artifact(&self, name: &str) -> Result<Artifact, ReelsmithError> {
        let path = self.temp_dir.path().join(name);
        let bytes = vec![0u8; 4096];
        std::fs::write(&path, &bytes).map_err(ReelsmithError::storage)?;
        Ok(Artifact {
            path,
            file_name: Some(name.to_string()),
            mime_type: Some("video/mp4".into()),
            size: bytes.len() as u64,
        })
    }
}
