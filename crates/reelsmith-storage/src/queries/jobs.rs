// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job rows and their lifecycle.
//!
//! Status changes are checked against [`JobStatus::can_transition_to`] inside
//! the same transaction that writes them, so concurrent writers cannot move a
//! job backwards.

use std::str::FromStr;

use reelsmith_core::types::JobCounts;
use reelsmith_core::{
    Job, JobId, JobKind, JobPayload, JobStatus, JobUpdate, NewJob, ReelsmithError, UserId,
};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;

const JOB_COLUMNS: &str =
    "id, user_id, kind, status, payload, result, note, created_at, updated_at";

fn conversion_err(
    col: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, Type::Text, Box::new(err))
}

fn row_to_job(row: &rusqlite::Row<'_>) -> rusqlite::Result<Job> {
    let kind: String = row.get(2)?;
    let status: String = row.get(3)?;
    let payload: String = row.get(4)?;
    Ok(Job {
        id: JobId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        kind: JobKind::from_str(&kind).map_err(|e| conversion_err(2, e))?,
        status: JobStatus::from_str(&status).map_err(|e| conversion_err(3, e))?,
        payload: serde_json::from_str::<JobPayload>(&payload).map_err(|e| conversion_err(4, e))?,
        result: row.get(5)?,
        note: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn encode_payload(payload: &JobPayload) -> Result<String, ReelsmithError> {
    serde_json::to_string(payload).map_err(ReelsmithError::storage)
}

/// Inserts a job and returns its id.
pub async fn create_job(db: &Database, job: NewJob) -> Result<JobId, ReelsmithError> {
    let payload = encode_payload(&job.payload)?;
    let user_id = job.user_id.0;
    let kind = job.kind.to_string();
    let status = job.status.to_string();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO jobs (user_id, kind, status, payload) VALUES (?1, ?2, ?3, ?4)",
                params![user_id, kind, status, payload],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map(JobId)
        .map_err(crate::database::map_tr_err)
}

enum UpdateOutcome {
    Applied,
    Missing,
    Rejected(JobStatus),
}

/// Applies `update` to one job in a single transaction.
///
/// Terminal jobs are immutable; any update to them is rejected.
pub async fn update_job(
    db: &Database,
    job_id: JobId,
    update: JobUpdate,
) -> Result<(), ReelsmithError> {
    let payload = update.payload.as_ref().map(encode_payload).transpose()?;
    let next = update.status;
    let status = next.map(|s| s.to_string());
    let (result, note) = (update.result, update.note);
    let sql = format!(
        "UPDATE jobs SET status = COALESCE(?1, status), payload = COALESCE(?2, payload),
         result = COALESCE(?3, result), note = COALESCE(?4, note), updated_at = {}
         WHERE id = ?5",
        super::NOW
    );

    let outcome = db
        .connection()
        .call(move |conn| -> Result<UpdateOutcome, rusqlite::Error> {
            let tx = conn.transaction()?;
            let current: Option<String> = tx
                .query_row(
                    "SELECT status FROM jobs WHERE id = ?1",
                    params![job_id.0],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(current) = current else {
                return Ok(UpdateOutcome::Missing);
            };
            let current = JobStatus::from_str(&current).map_err(|e| conversion_err(0, e))?;
            let allowed = match next {
                Some(next) => current.can_transition_to(next),
                None => !current.is_terminal(),
            };
            if !allowed {
                return Ok(UpdateOutcome::Rejected(current));
            }
            tx.execute(&sql, params![status, payload, result, note, job_id.0])?;
            tx.commit()?;
            Ok(UpdateOutcome::Applied)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        UpdateOutcome::Applied => Ok(()),
        UpdateOutcome::Missing => Err(ReelsmithError::NotFound {
            entity: "job",
            id: job_id.to_string(),
        }),
        UpdateOutcome::Rejected(from) => Err(ReelsmithError::InvalidTransition {
            job_id,
            from,
            to: next.unwrap_or(from),
        }),
    }
}

pub async fn get_job(db: &Database, job_id: JobId) -> Result<Option<Job>, ReelsmithError> {
    let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1");
    db.connection()
        .call(move |conn| -> Result<Option<Job>, rusqlite::Error> {
            conn.query_row(&sql, params![job_id.0], row_to_job).optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Jobs owned by a user, newest first.
pub async fn list_jobs(
    db: &Database,
    user_id: &UserId,
    limit: usize,
) -> Result<Vec<Job>, ReelsmithError> {
    let user_id = user_id.0.clone();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2");
    db.connection()
        .call(move |conn| -> Result<Vec<Job>, rusqlite::Error> {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![user_id, limit], row_to_job)?;
            let mut jobs = Vec::new();
            for row in rows {
                jobs.push(row?);
            }
            Ok(jobs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn count_jobs(db: &Database, user_id: &UserId) -> Result<JobCounts, ReelsmithError> {
    let user_id = user_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<JobCounts, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(status = 'completed'), 0),
                        COALESCE(SUM(status = 'failed'), 0)
                 FROM jobs WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let count = |idx: usize| row.get::<_, i64>(idx).map(|n| n.max(0) as u64);
                    Ok(JobCounts {
                        total: count(0)?,
                        completed: count(1)?,
                        failed: count(2)?,
                    })
                },
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fails every job left in `draft` or `processing`. Returns the number changed.
pub async fn fail_stale_jobs(db: &Database, reason: &str) -> Result<usize, ReelsmithError> {
    let reason = reason.to_string();
    let sql = format!(
        "UPDATE jobs SET status = 'failed', note = ?1, updated_at = {}
         WHERE status IN ('draft', 'processing')",
        super::NOW
    );
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(&sql, params![reason])
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::users::get_or_create_user;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn logo_job(db: &Database, user: &str, status: JobStatus) -> JobId {
        let uid = UserId(user.into());
        get_or_create_user(db, &uid).await.unwrap();
        create_job(
            db,
            NewJob {
                user_id: uid,
                kind: JobKind::Logo,
                status,
                payload: JobPayload::Image {
                    description: "Programming".into(),
                    style: "Minimal laptop icon".into(),
                    prompt: "Theme: Programming".into(),
                },
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let (db, _dir) = setup_db().await;
        let id = logo_job(&db, "u1", JobStatus::Processing).await;

        let job = get_job(&db, id).await.unwrap().unwrap();
        assert_eq!(job.id, id);
        assert_eq!(job.kind, JobKind::Logo);
        assert_eq!(job.status, JobStatus::Processing);
        assert!(job.result.is_none());
        assert!(matches!(job.payload, JobPayload::Image { ref style, .. } if style == "Minimal laptop icon"));
    }

    #[tokio::test]
    async fn get_missing_job_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_job(&db, JobId(404)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_requires_existing_user() {
        let (db, _dir) = setup_db().await;
        let result = create_job(
            &db,
            NewJob {
                user_id: UserId("ghost".into()),
                kind: JobKind::Banner,
                status: JobStatus::Processing,
                payload: JobPayload::Image {
                    description: "d".into(),
                    style: "s".into(),
                    prompt: "p".into(),
                },
            },
        )
        .await;
        assert!(matches!(result, Err(ReelsmithError::Storage { .. })));
    }

    #[tokio::test]
    async fn completes_with_result() {
        let (db, _dir) = setup_db().await;
        let id = logo_job(&db, "u1", JobStatus::Processing).await;

        update_job(&db, id, JobUpdate::completed("https://cdn.example/logo.png"))
            .await
            .unwrap();
        let job = get_job(&db, id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result.as_deref(), Some("https://cdn.example/logo.png"));
    }

    #[tokio::test]
    async fn terminal_job_rejects_any_update() {
        let (db, _dir) = setup_db().await;
        let id = logo_job(&db, "u1", JobStatus::Processing).await;
        update_job(&db, id, JobUpdate::failed("timeout")).await.unwrap();

        let err = update_job(&db, id, JobUpdate::status(JobStatus::Processing))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReelsmithError::InvalidTransition { from: JobStatus::Failed, to: JobStatus::Processing, .. }
        ));

        let err = update_job(&db, id, JobUpdate::default().with_note("late"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReelsmithError::InvalidTransition { .. }));

        let job = get_job(&db, id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.note.as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn processing_cannot_return_to_draft() {
        let (db, _dir) = setup_db().await;
        let id = logo_job(&db, "u1", JobStatus::Processing).await;
        let err = update_job(&db, id, JobUpdate::status(JobStatus::Draft))
            .await
            .unwrap_err();
        assert!(matches!(err, ReelsmithError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn draft_payload_update_keeps_other_columns() {
        let (db, _dir) = setup_db().await;
        let uid = UserId("u2".into());
        get_or_create_user(&db, &uid).await.unwrap();
        let id = create_job(
            &db,
            NewJob {
                user_id: uid,
                kind: JobKind::Video,
                status: JobStatus::Draft,
                payload: JobPayload::Video {
                    topic: "Intro to sorting algorithms".into(),
                    title: None,
                    description: None,
                    tags: vec![],
                    file_path: "/tmp/v.mp4".into(),
                    thumbnail_path: None,
                },
            },
        )
        .await
        .unwrap();

        let payload = JobPayload::Video {
            topic: "Intro to sorting algorithms".into(),
            title: Some("Intro to sorting algorithms".into()),
            description: Some("raw".into()),
            tags: vec!["#youtube".into()],
            file_path: "/tmp/v.mp4".into(),
            thumbnail_path: None,
        };
        update_job(
            &db,
            id,
            JobUpdate::status(JobStatus::Processing).with_payload(payload.clone()),
        )
        .await
        .unwrap();

        let job = get_job(&db, id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.payload, payload);
        assert!(job.note.is_none());
    }

    #[tokio::test]
    async fn update_missing_job_is_not_found() {
        let (db, _dir) = setup_db().await;
        let err = update_job(&db, JobId(99), JobUpdate::completed("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReelsmithError::NotFound { entity: "job", .. }));
    }

    #[tokio::test]
    async fn list_and_count_are_per_user() {
        let (db, _dir) = setup_db().await;
        let a1 = logo_job(&db, "a", JobStatus::Processing).await;
        let a2 = logo_job(&db, "a", JobStatus::Processing).await;
        logo_job(&db, "b", JobStatus::Processing).await;
        update_job(&db, a1, JobUpdate::completed("r")).await.unwrap();
        update_job(&db, a2, JobUpdate::failed("boom")).await.unwrap();

        let jobs = list_jobs(&db, &UserId("a".into()), 10).await.unwrap();
        assert_eq!(jobs.iter().map(|j| j.id).collect::<Vec<_>>(), vec![a2, a1]);

        let counts = count_jobs(&db, &UserId("a".into())).await.unwrap();
        assert_eq!(counts, JobCounts { total: 2, completed: 1, failed: 1 });

        let empty = count_jobs(&db, &UserId("nobody".into())).await.unwrap();
        assert_eq!(empty, JobCounts::default());
    }

    #[tokio::test]
    async fn fail_stale_only_touches_open_jobs() {
        let (db, _dir) = setup_db().await;
        let open = logo_job(&db, "a", JobStatus::Processing).await;
        let draft = logo_job(&db, "a", JobStatus::Draft).await;
        let done = logo_job(&db, "a", JobStatus::Processing).await;
        update_job(&db, done, JobUpdate::completed("r")).await.unwrap();

        let changed = fail_stale_jobs(&db, "interrupted by restart").await.unwrap();
        assert_eq!(changed, 2);

        for id in [open, draft] {
            let job = get_job(&db, id).await.unwrap().unwrap();
            assert_eq!(job.status, JobStatus::Failed);
            assert_eq!(job.note.as_deref(), Some("interrupted by restart"));
        }
        let job = get_job(&db, done).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
    }
}
