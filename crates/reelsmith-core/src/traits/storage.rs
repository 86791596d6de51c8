// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence traits for users, jobs and conversation cursors.

use async_trait::async_trait;

use crate::conversation::ConversationState;
use crate::error::ReelsmithError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Job, JobCounts, JobId, JobUpdate, NewJob, User, UserId};

/// Durable record of users and their jobs.
///
/// Every write is atomic per row. `update` rejects status changes that would
/// move a job backwards along its lifecycle with
/// [`ReelsmithError::InvalidTransition`].
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Returns the user row, inserting it on first contact.
    async fn get_or_create_user(&self, user_id: &UserId) -> Result<User, ReelsmithError>;

    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, ReelsmithError>;

    /// Records whether the user's video-hosting account is linked.
    async fn set_connected(&self, user_id: &UserId, connected: bool)
    -> Result<(), ReelsmithError>;

    async fn create_job(&self, job: NewJob) -> Result<JobId, ReelsmithError>;

    async fn update_job(&self, job_id: JobId, update: JobUpdate) -> Result<(), ReelsmithError>;

    async fn get_job(&self, job_id: JobId) -> Result<Option<Job>, ReelsmithError>;

    /// Jobs owned by `user_id`, newest first.
    async fn list_jobs(&self, user_id: &UserId, limit: usize) -> Result<Vec<Job>, ReelsmithError>;

    async fn count_jobs(&self, user_id: &UserId) -> Result<JobCounts, ReelsmithError>;

    /// Marks every `draft`/`processing` job as `failed` with `reason`.
    ///
    /// Used on startup: a job that was running when the process stopped can
    /// never reach a terminal status on its own. Returns the number of rows changed.
    async fn fail_stale_jobs(&self, reason: &str) -> Result<usize, ReelsmithError>;
}

/// Storage for per-user conversation cursors.
///
/// Losing a cursor is harmless: a missing entry reads as idle.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn load(&self, user_id: &UserId) -> Result<ConversationState, ReelsmithError>;

    async fn save(&self, user_id: &UserId, state: &ConversationState)
    -> Result<(), ReelsmithError>;

    async fn clear(&self, user_id: &UserId) -> Result<(), ReelsmithError>;
}

/// A storage backend providing both stores.
#[async_trait]
pub trait StorageAdapter: PluginAdapter + JobStore + ConversationStore {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), ReelsmithError>;

    /// Closes the storage backend, flushing pending writes and releasing connections.
    async fn close(&self) -> Result<(), ReelsmithError>;
}
