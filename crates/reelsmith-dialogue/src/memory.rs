// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process conversation store.
//!
//! Cursors live only as long as the process. Useful when losing a dialogue
//! in progress on restart is acceptable, and in tests.

use async_trait::async_trait;
use dashmap::DashMap;

use reelsmith_core::{ConversationState, ConversationStore, ReelsmithError, UserId};

#[derive(Debug, Default)]
pub struct MemoryConversationStore {
    states: DashMap<UserId, ConversationState>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with an active dialogue.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn load(&self, user_id: &UserId) -> Result<ConversationState, ReelsmithError> {
        Ok(self
            .states
            .get(user_id)
            .map(|s| s.value().clone())
            .unwrap_or_default())
    }

    async fn save(
        &self,
        user_id: &UserId,
        state: &ConversationState,
    ) -> Result<(), ReelsmithError> {
        if state.is_idle() {
            self.states.remove(user_id);
        } else {
            self.states.insert(user_id.clone(), state.clone());
        }
        Ok(())
    }

    async fn clear(&self, user_id: &UserId) -> Result<(), ReelsmithError> {
        self.states.remove(user_id);
        Ok(())
    }
}
