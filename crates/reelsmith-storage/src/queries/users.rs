// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User rows.

use reelsmith_core::{ReelsmithError, User, UserId};
use rusqlite::{OptionalExtension, params};

use crate::database::Database;

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(row.get(0)?),
        connected: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

/// Returns the user, inserting a fresh row on first contact.
pub async fn get_or_create_user(db: &Database, user_id: &UserId) -> Result<User, ReelsmithError> {
    let id = user_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<User, rusqlite::Error> {
            conn.execute("INSERT OR IGNORE INTO users (id) VALUES (?1)", params![id])?;
            conn.query_row(
                "SELECT id, connected, created_at, updated_at FROM users WHERE id = ?1",
                params![id],
                row_to_user,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_user(db: &Database, user_id: &UserId) -> Result<Option<User>, ReelsmithError> {
    let id = user_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, connected, created_at, updated_at FROM users WHERE id = ?1",
                params![id],
                row_to_user,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Sets the account-link flag, creating the user if needed.
pub async fn set_connected(
    db: &Database,
    user_id: &UserId,
    connected: bool,
) -> Result<(), ReelsmithError> {
    let id = user_id.0.clone();
    let sql = format!(
        "INSERT INTO users (id, connected) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET connected = excluded.connected,
         updated_at = {}",
        super::NOW
    );
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(&sql, params![id, connected])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
