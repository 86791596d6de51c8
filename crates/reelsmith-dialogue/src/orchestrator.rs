// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dialogue orchestrator.
//!
//! Bridges inbound events to the state machine, persists the cursor, and
//! runs the side-effecting operation of a completed dialogue exactly once.
//! Every failure is folded into the returned [`Effect`]; nothing here
//! propagates an error to the caller. Files handed in with an event and
//! rendered thumbnails are removed once the event has been handled.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use reelsmith_config::model::ReelsmithConfig;
use reelsmith_core::{
    Artifact, ConversationState, ConversationStore, Effect, Event, Field, ImageGenerator, JobId,
    JobKind, JobPayload, JobStatus, JobStore, JobUpdate, NewJob, ReelsmithError, Step,
    TerminalResult, TextGenerator, ThumbnailRenderer, User, UserId, VideoHost,
};

use crate::fsm::{self, ImageKind, Signal, Submission};
use crate::guard::UserGuards;
use crate::{prompts, seo};

/// The stores and external systems the orchestrator drives.
#[derive(Clone)]
pub struct Collaborators {
    pub jobs: Arc<dyn JobStore>,
    pub conversations: Arc<dyn ConversationStore>,
    pub text: Arc<dyn TextGenerator>,
    pub images: Arc<dyn ImageGenerator>,
    pub videos: Arc<dyn VideoHost>,
    pub thumbnails: Arc<dyn ThumbnailRenderer>,
}

/// Orchestrator settings taken from the `[bot]` section.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Language requested from the text generator.
    pub language: String,
    /// Root for generated files; thumbnails go under `thumbnails/`.
    pub work_dir: PathBuf,
    /// Uploads go to a YouTube account; shown to users as "linked".
    pub youtube_linked: bool,
    /// Render and attach a thumbnail after each upload.
    pub attach_thumbnails: bool,
}

impl OrchestratorSettings {
    pub fn from_config(config: &ReelsmithConfig) -> Self {
        Self {
            language: config.bot.language.clone(),
            work_dir: PathBuf::from(&config.bot.work_dir),
            youtube_linked: config.youtube.access_token.is_some(),
            attach_thumbnails: config.youtube.attach_thumbnails,
        }
    }
}

pub struct Orchestrator {
    collaborators: Collaborators,
    settings: OrchestratorSettings,
    guards: UserGuards,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators, settings: OrchestratorSettings) -> Self {
        info!(language = settings.language.as_str(), "dialogue orchestrator initialized");
        Self {
            collaborators,
            settings,
            guards: UserGuards::new(),
        }
    }

    /// Whether `user_id` has a confirmed operation running.
    pub fn is_busy(&self, user_id: &UserId) -> bool {
        self.guards.is_busy(user_id)
    }

    /// Handles one event for one user and returns what to tell them.
    ///
    /// A file carried by the event is deleted afterwards, whether it was
    /// uploaded, ignored or refused as busy.
    pub async fn handle(&self, user_id: &UserId, event: Event) -> Effect {
        let received = match &event {
            Event::File(artifact) => Some(artifact.path.clone()),
            _ => None,
        };
        let effect = self.dispatch(user_id, event).await;
        if let Some(path) = received {
            discard(&path).await;
        }
        effect
    }

    async fn dispatch(&self, user_id: &UserId, event: Event) -> Effect {
        if self.guards.is_busy(user_id) {
            debug!(user_id = %user_id, "event while busy");
            return Effect::Busy;
        }
        let lock = self.guards.lock(user_id).await;
        if self.guards.is_busy(user_id) {
            return Effect::Busy;
        }

        let mut user = match self.collaborators.jobs.get_or_create_user(user_id).await {
            Ok(user) => user,
            Err(e) => return aborted(user_id, "user lookup", &e),
        };
        if user.connected != self.settings.youtube_linked {
            match self
                .collaborators
                .jobs
                .set_connected(user_id, self.settings.youtube_linked)
                .await
            {
                Ok(()) => user.connected = self.settings.youtube_linked,
                Err(e) => warn!(user_id = %user_id, error = %e, "connection flag not updated"),
            }
        }

        match event {
            Event::Profile => {
                return match self.collaborators.jobs.count_jobs(user_id).await {
                    Ok(counts) => Effect::Profile { user, counts },
                    Err(e) => aborted(user_id, "job count", &e),
                };
            }
            Event::Statistics => {
                drop(lock);
                return self.channel_statistics(user_id).await;
            }
            _ => {}
        }

        let current = match self.collaborators.conversations.load(user_id).await {
            Ok(state) => state,
            Err(e) => return aborted(user_id, "conversation load", &e),
        };

        let transition = fsm::advance(&current, event);
        if transition.state != current
            && let Err(e) = self.persist(user_id, &transition.state).await
        {
            return aborted(user_id, "conversation save", &e);
        }

        match transition.signal {
            Signal::Menu => Effect::Menu {
                connected: user.connected,
            },
            Signal::Prompt(step) => prompt_effect(&transition.state, step),
            Signal::EmptyInput(step) => Effect::EmptyInput { step },
            Signal::Ignored => Effect::Ignored,
            Signal::Cancelled => Effect::Cancelled,
            Signal::Rejected => Effect::Rejected,
            Signal::Submitted(submission) => {
                let Some(_in_flight) = self.guards.begin(user_id) else {
                    return Effect::Busy;
                };
                drop(lock);
                self.execute(&user, submission).await
            }
        }
    }

    async fn channel_statistics(&self, user_id: &UserId) -> Effect {
        match self.collaborators.videos.channel_stats().await {
            Ok(stats) => Effect::Statistics { stats },
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "channel statistics unavailable");
                Effect::StatisticsUnavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn persist(
        &self,
        user_id: &UserId,
        state: &ConversationState,
    ) -> Result<(), ReelsmithError> {
        if state.is_idle() {
            self.collaborators.conversations.clear(user_id).await
        } else {
            self.collaborators.conversations.save(user_id, state).await
        }
    }

    async fn execute(&self, user: &User, submission: Submission) -> Effect {
        match submission {
            Submission::Seo { topic } => self.run_seo(&user.id, topic).await,
            Submission::Image {
                kind,
                description,
                style,
            } => self.run_image(&user.id, kind, description, style).await,
            Submission::Upload { topic, video } => self.run_upload(&user.id, topic, video).await,
        }
    }

    /// SEO runs are answered directly and never recorded as jobs.
    async fn run_seo(&self, user_id: &UserId, topic: String) -> Effect {
        info!(user_id = %user_id, "generating SEO metadata");
        match self
            .collaborators
            .text
            .generate(&topic, &self.settings.language)
            .await
        {
            Ok(raw) => {
                let metadata = seo::extract_metadata(&raw, &topic);
                Effect::SeoReady { topic, metadata }
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "SEO generation failed");
                Effect::SeoFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn run_image(
        &self,
        user_id: &UserId,
        kind: ImageKind,
        description: String,
        style: String,
    ) -> Effect {
        let job_kind = kind.job_kind();
        let prompt = prompts::image_prompt(kind, &description, &style);
        let new_job = NewJob {
            user_id: user_id.clone(),
            kind: job_kind,
            status: JobStatus::Processing,
            payload: JobPayload::Image {
                description,
                style,
                prompt: prompt.clone(),
            },
        };
        let job_id = match self.collaborators.jobs.create_job(new_job).await {
            Ok(id) => id,
            Err(e) => return aborted(user_id, "job create", &e),
        };
        info!(user_id = %user_id, job_id = %job_id, kind = %job_kind, "image job started");

        let outcome = self
            .collaborators
            .images
            .generate(prompts::image_request(kind, prompt))
            .await;
        self.finish(job_id, job_kind, outcome, None).await
    }

    async fn run_upload(&self, user_id: &UserId, topic: String, video: Artifact) -> Effect {
        let file_path = video.path.to_string_lossy().into_owned();
        let draft = NewJob {
            user_id: user_id.clone(),
            kind: JobKind::Video,
            status: JobStatus::Draft,
            payload: JobPayload::Video {
                topic: topic.clone(),
                title: None,
                description: None,
                tags: Vec::new(),
                file_path: file_path.clone(),
                thumbnail_path: None,
            },
        };
        let job_id = match self.collaborators.jobs.create_job(draft).await {
            Ok(id) => id,
            Err(e) => return aborted(user_id, "job create", &e),
        };
        info!(user_id = %user_id, job_id = %job_id, "upload job drafted");

        let raw = match self
            .collaborators
            .text
            .generate(&topic, &self.settings.language)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                let reason = format!("metadata generation failed: {e}");
                return self
                    .finish(job_id, JobKind::Video, TerminalResult::Failure(reason), None)
                    .await;
            }
        };
        let metadata = seo::video_metadata(&seo::extract_metadata(&raw, &topic));

        let thumbnail = if self.settings.attach_thumbnails {
            match self
                .collaborators
                .thumbnails
                .render(&metadata.title, &self.settings.work_dir.join("thumbnails"))
                .await
            {
                Ok(artifact) => Some(artifact),
                Err(e) => {
                    warn!(job_id = %job_id, error = %e, "thumbnail render failed");
                    None
                }
            }
        } else {
            None
        };

        let payload = JobPayload::Video {
            topic,
            title: Some(metadata.title.clone()),
            description: Some(metadata.description.clone()),
            tags: metadata.tags.clone(),
            file_path,
            thumbnail_path: thumbnail
                .as_ref()
                .map(|t| t.path.to_string_lossy().into_owned()),
        };
        if let Err(e) = self
            .collaborators
            .jobs
            .update_job(
                job_id,
                JobUpdate::status(JobStatus::Processing).with_payload(payload),
            )
            .await
        {
            if let Some(thumbnail) = &thumbnail {
                discard(&thumbnail.path).await;
            }
            if let Err(fail_err) = self
                .collaborators
                .jobs
                .update_job(job_id, JobUpdate::failed(format!("job update failed: {e}")))
                .await
            {
                warn!(job_id = %job_id, error = %fail_err, "draft left for the restart sweep");
            }
            return aborted(user_id, "job update", &e);
        }

        let outcome = self.collaborators.videos.upload(&video, &metadata).await;

        let note = match (&outcome, &thumbnail) {
            (TerminalResult::Success(video_id), Some(thumbnail)) => {
                match self
                    .collaborators
                    .videos
                    .attach_thumbnail(video_id, thumbnail)
                    .await
                {
                    Ok(()) => None,
                    Err(e) => {
                        warn!(job_id = %job_id, error = %e, "thumbnail not attached");
                        Some(format!("thumbnail not attached: {e}"))
                    }
                }
            }
            (TerminalResult::Success(_), None) if self.settings.attach_thumbnails => {
                Some("thumbnail not rendered".to_string())
            }
            _ => None,
        };
        if let Some(thumbnail) = &thumbnail {
            discard(&thumbnail.path).await;
        }

        self.finish(job_id, JobKind::Video, outcome, note).await
    }

    /// Records the terminal status. A store failure here cannot undo the
    /// external work, so it is logged and flagged on the effect.
    async fn finish(
        &self,
        job_id: JobId,
        kind: JobKind,
        outcome: TerminalResult,
        note: Option<String>,
    ) -> Effect {
        let update = match &outcome {
            TerminalResult::Success(reference) => {
                let update = JobUpdate::completed(reference.clone());
                match &note {
                    Some(n) => update.with_note(n.clone()),
                    None => update,
                }
            }
            TerminalResult::Failure(reason) => JobUpdate::failed(reason.clone()),
        };

        let unrecorded = match self.collaborators.jobs.update_job(job_id, update).await {
            Ok(()) => false,
            Err(e) => {
                let reference = match &outcome {
                    TerminalResult::Success(r) | TerminalResult::Failure(r) => r.as_str(),
                };
                error!(
                    job_id = %job_id,
                    kind = %kind,
                    reference,
                    error = %e,
                    "job outcome not recorded"
                );
                true
            }
        };

        match &outcome {
            TerminalResult::Success(_) => info!(job_id = %job_id, kind = %kind, "job completed"),
            TerminalResult::Failure(reason) => {
                warn!(job_id = %job_id, kind = %kind, reason = reason.as_str(), "job failed")
            }
        }

        Effect::JobFinished {
            job_id,
            kind,
            outcome,
            note,
            unrecorded,
        }
    }
}

fn prompt_effect(state: &ConversationState, step: Step) -> Effect {
    let Some(workflow) = state.workflow() else {
        return Effect::Ignored;
    };
    if step == Step::ConfirmationPending {
        return Effect::ConfirmationRequested {
            workflow,
            description: state.field(Field::Description).unwrap_or_default().to_string(),
            style: state.field(Field::Style).unwrap_or_default().to_string(),
        };
    }
    Effect::Prompt { workflow, step }
}

/// Removes a scratch file; a file that is already gone is fine.
async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "scratch file removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "scratch file not removed"),
    }
}

fn aborted(user_id: &UserId, stage: &str, e: &ReelsmithError) -> Effect {
    error!(user_id = %user_id, stage, error = %e, "storage failure, step aborted");
    Effect::Aborted {
        reason: e.to_string(),
    }
}
