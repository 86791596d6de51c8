// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted conversation cursors, stored as JSON.

use reelsmith_core::{ConversationState, ReelsmithError, UserId};
use rusqlite::{OptionalExtension, params};
use tracing::warn;

use crate::database::Database;

/// Loads the cursor for a user. Missing or unreadable rows read as idle.
pub async fn load_state(
    db: &Database,
    user_id: &UserId,
) -> Result<ConversationState, ReelsmithError> {
    let id = user_id.0.clone();
    let raw = db
        .connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row(
                "SELECT state FROM conversation_states WHERE user_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    Ok(match raw {
        None => ConversationState::idle(),
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(user_id = %user_id, error = %e, "discarding unreadable conversation state");
            ConversationState::idle()
        }),
    })
}

pub async fn save_state(
    db: &Database,
    user_id: &UserId,
    state: &ConversationState,
) -> Result<(), ReelsmithError> {
    let id = user_id.0.clone();
    let json = serde_json::to_string(state).map_err(ReelsmithError::storage)?;
    let sql = format!(
        "INSERT INTO conversation_states (user_id, state) VALUES (?1, ?2)
         ON CONFLICT(user_id) DO UPDATE SET state = excluded.state, updated_at = {}",
        super::NOW
    );
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(&sql, params![id, json])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn clear_state(db: &Database, user_id: &UserId) -> Result<(), ReelsmithError> {
    let id = user_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "DELETE FROM conversation_states WHERE user_id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
