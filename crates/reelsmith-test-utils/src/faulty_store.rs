// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A job store wrapper that fails selected writes on demand.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use reelsmith_core::types::JobCounts;
use reelsmith_core::{
    Job, JobId, JobStatus, JobStore, JobUpdate, NewJob, ReelsmithError, User, UserId,
};

/// Delegates to an inner store unless a failure switch is on.
pub struct FaultyJobStore {
    inner: Arc<dyn JobStore>,
    fail_create: AtomicBool,
    fail_terminal_updates: AtomicBool,
    fail_processing_updates: AtomicBool,
}

impl FaultyJobStore {
    pub fn new(inner: Arc<dyn JobStore>) -> Self {
        Self {
            inner,
            fail_create: AtomicBool::new(false),
            fail_terminal_updates: AtomicBool::new(false),
            fail_processing_updates: AtomicBool::new(false),
        }
    }

    pub fn fail_create(&self, on: bool) {
        self.fail_create.store(on, Ordering::SeqCst);
    }

    /// Fails updates that would move a job to `completed` or `failed`.
    pub fn fail_terminal_updates(&self, on: bool) {
        self.fail_terminal_updates.store(on, Ordering::SeqCst);
    }

    /// Fails updates that would move a job to `processing`.
    pub fn fail_processing_updates(&self, on: bool) {
        self.fail_processing_updates.store(on, Ordering::SeqCst);
    }

    fn injected() -> ReelsmithError {
        ReelsmithError::storage("injected storage failure")
    }
}

#[async_trait]
impl JobStore for FaultyJobStore {
    async fn get_or_create_user(&self, user_id: &UserId) -> Result<User, ReelsmithError> {
        self.inner.get_or_create_user(user_id).await
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, ReelsmithError> {
        self.inner.get_user(user_id).await
    }

    async fn set_connected(
        &self,
        user_id: &UserId,
        connected: bool,
    ) -> Result<(), ReelsmithError> {
        self.inner.set_connected(user_id, connected).await
    }

    async fn create_job(&self, job: NewJob) -> Result<JobId, ReelsmithError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        self.inner.create_job(job).await
    }

    async fn update_job(&self, job_id: JobId, update: JobUpdate) -> Result<(), ReelsmithError> {
        let terminal = update.status.is_some_and(|s| s.is_terminal());
        if terminal && self.fail_terminal_updates.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        if update.status == Some(JobStatus::Processing)
            && self.fail_processing_updates.load(Ordering::SeqCst)
        {
            return Err(Self::injected());
        }
        self.inner.update_job(job_id, update).await
    }

    async fn get_job(&self, job_id: JobId) -> Result<Option<Job>, ReelsmithError> {
        self.inner.get_job(job_id).await
    }

    async fn list_jobs(&self, user_id: &UserId, limit: usize) -> Result<Vec<Job>, ReelsmithError> {
        self.inner.list_jobs(user_id, limit).await
    }

    async fn count_jobs(&self, user_id: &UserId) -> Result<JobCounts, ReelsmithError> {
        self.inner.count_jobs(user_id).await
    }

    async fn fail_stale_jobs(&self, reason: &str) -> Result<usize, ReelsmithError> {
        self.inner.fail_stale_jobs(reason).await
    }
}
