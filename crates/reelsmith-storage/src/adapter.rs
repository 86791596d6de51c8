// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use reelsmith_config::model::StorageConfig;
use reelsmith_core::types::JobCounts;
use reelsmith_core::{
    AdapterType, ConversationState, ConversationStore, HealthStatus, Job, JobId, JobStore,
    JobUpdate, NewJob, PluginAdapter, ReelsmithError, StorageAdapter, User, UserId,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// The database is opened on [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// The database connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, ReelsmithError> {
        self.db
            .get()
            .ok_or_else(|| ReelsmithError::storage("storage not initialized, call initialize() first"))
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ReelsmithError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch("SELECT 1;") })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReelsmithError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ReelsmithError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| ReelsmithError::storage("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ReelsmithError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl JobStore for SqliteStorage {
    async fn get_or_create_user(&self, user_id: &UserId) -> Result<User, ReelsmithError> {
        queries::users::get_or_create_user(self.db()?, user_id).await
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, ReelsmithError> {
        queries::users::get_user(self.db()?, user_id).await
    }

    async fn set_connected(
        &self,
        user_id: &UserId,
        connected: bool,
    ) -> Result<(), ReelsmithError> {
        queries::users::set_connected(self.db()?, user_id, connected).await
    }

    async fn create_job(&self, job: NewJob) -> Result<JobId, ReelsmithError> {
        queries::jobs::create_job(self.db()?, job).await
    }

    async fn update_job(&self, job_id: JobId, update: JobUpdate) -> Result<(), ReelsmithError> {
        queries::jobs::update_job(self.db()?, job_id, update).await
    }

    async fn get_job(&self, job_id: JobId) -> Result<Option<Job>, ReelsmithError> {
        queries::jobs::get_job(self.db()?, job_id).await
    }

    async fn list_jobs(&self, user_id: &UserId, limit: usize) -> Result<Vec<Job>, ReelsmithError> {
        queries::jobs::list_jobs(self.db()?, user_id, limit).await
    }

    async fn count_jobs(&self, user_id: &UserId) -> Result<JobCounts, ReelsmithError> {
        queries::jobs::count_jobs(self.db()?, user_id).await
    }

    async fn fail_stale_jobs(&self, reason: &str) -> Result<usize, ReelsmithError> {
        queries::jobs::fail_stale_jobs(self.db()?, reason).await
    }
}

#[async_trait]
impl ConversationStore for SqliteStorage {
    async fn load(&self, user_id: &UserId) -> Result<ConversationState, ReelsmithError> {
        queries::conversations::load_state(self.db()?, user_id).await
    }

    async fn save(
        &self,
        user_id: &UserId,
        state: &ConversationState,
    ) -> Result<(), ReelsmithError> {
        queries::conversations::save_state(self.db()?, user_id, state).await
    }

    async fn clear(&self, user_id: &UserId) -> Result<(), ReelsmithError> {
        queries::conversations::clear_state(self.db()?, user_id).await
    }
}
