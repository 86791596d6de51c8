// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All queries are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use reelsmith_core::ReelsmithError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Handle to the SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` in WAL mode and
    /// applies pending migrations.
    pub async fn open(path: &str) -> Result<Self, ReelsmithError> {
        Self::open_with(path, true).await
    }

    /// Like [`open`](Self::open) with explicit journal mode.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, ReelsmithError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ReelsmithError::storage)?;
        }

        // Schema setup runs on a short-lived blocking connection so refinery
        // gets a plain `&mut rusqlite::Connection`.
        let setup_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), ReelsmithError> {
            let mut conn =
                rusqlite::Connection::open(&setup_path).map_err(ReelsmithError::storage)?;
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")
                    .map_err(ReelsmithError::storage)?;
            }
            run_migrations(&mut conn)
        })
        .await
        .map_err(|e| ReelsmithError::Internal(format!("migration task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ReelsmithError::storage(e.to_string()))?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The single serialized connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flushes the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), ReelsmithError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoints the WAL and closes the connection.
    pub async fn close(self) -> Result<(), ReelsmithError> {
        self.checkpoint().await?;
        self.conn
            .close()
            .await
            .map_err(|e| ReelsmithError::storage(e.to_string()))
    }
}

/// Converts a tokio-rusqlite call error into a storage error.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ReelsmithError {
    ReelsmithError::storage(e.to_string())
}
