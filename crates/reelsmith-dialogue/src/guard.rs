// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user serialization and the in-flight ("busy") marker.

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use tokio::sync::{Mutex, OwnedMutexGuard};

use reelsmith_core::UserId;

/// Keyed locks plus the set of users with a confirmed operation running.
///
/// The lock serializes state-machine steps for one user; it is never held
/// across a collaborator call. The in-flight set is what makes later events
/// for that user answer `Busy` instead of queueing.
#[derive(Debug, Default)]
pub struct UserGuards {
    locks: Arc<DashMap<UserId, Arc<Mutex<()>>>>,
    in_flight: Arc<DashSet<UserId>>,
}

impl UserGuards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `user_id`'s conversation.
    pub async fn lock(&self, user_id: &UserId) -> UserLock {
        let mutex = Arc::clone(self.locks.entry(user_id.clone()).or_default().value());
        UserLock {
            guard: Some(mutex.lock_owned().await),
            locks: Arc::clone(&self.locks),
            user_id: user_id.clone(),
        }
    }

    /// Number of users with a lock entry, held or awaited.
    pub fn tracked_users(&self) -> usize {
        self.locks.len()
    }

    pub fn is_busy(&self, user_id: &UserId) -> bool {
        self.in_flight.contains(user_id)
    }

    /// Marks `user_id` busy until the returned guard is dropped.
    ///
    /// Returns `None` if the user is already busy.
    pub fn begin(&self, user_id: &UserId) -> Option<InFlightGuard> {
        if self.in_flight.insert(user_id.clone()) {
            Some(InFlightGuard {
                set: Arc::clone(&self.in_flight),
                user_id: user_id.clone(),
            })
        } else {
            None
        }
    }

    /// Number of users with a running operation.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

/// Exclusive access to one user's conversation.
///
/// The map entry is removed on drop once no other task holds or awaits it.
#[derive(Debug)]
pub struct UserLock {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<UserId, Arc<Mutex<()>>>>,
    user_id: UserId,
}

impl Drop for UserLock {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(&self.user_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

/// Clears the busy marker on drop, including when the task panics.
#[derive(Debug)]
pub struct InFlightGuard {
    set: Arc<DashSet<UserId>>,
    user_id: UserId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set.remove(&self.user_id);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn second_begin_is_refused_until_drop() {
        let guards = UserGuards::new();
        let user = UserId("1".into());

        let first = guards.begin(&user).expect("first begin");
        assert!(guards.is_busy(&user));
        assert!(guards.begin(&user).is_none());

        drop(first);
        assert!(!guards.is_busy(&user));
        assert!(guards.begin(&user).is_some());
    }

    #[test]
    fn users_are_independent() {
        let guards = UserGuards::new();
        let _a = guards.begin(&UserId("a".into())).expect("a");
        assert!(guards.begin(&UserId("b".into())).is_some());
        assert_eq!(guards.in_flight_count(), 1);
    }

    #[tokio::test]
    async fn lock_serializes_one_user() {
        let guards = Arc::new(UserGuards::new());
        let user = UserId("1".into());
        let held = guards.lock(&user).await;

        let contender = {
            let guards = Arc::clone(&guards);
            let user = user.clone();
            tokio::spawn(async move {
                let _g = guards.lock(&user).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        // Another user is not blocked.
        let _other = guards.lock(&UserId("2".into())).await;

        drop(held);
        contender.await.expect("contender completes");
    }

    #[tokio::test]
    async fn released_locks_are_pruned() {
        let guards = Arc::new(UserGuards::new());
        let user = UserId("1".into());

        let held = guards.lock(&user).await;
        let contender = {
            let guards = Arc::clone(&guards);
            let user = user.clone();
            tokio::spawn(async move {
                let _g = guards.lock(&user).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The waiting task keeps the entry alive.
        drop(held);
        assert_eq!(guards.tracked_users(), 1);

        contender.await.expect("contender completes");
        assert_eq!(guards.tracked_users(), 0);

        for id in 0..10 {
            drop(guards.lock(&UserId(id.to_string())).await);
        }
        assert_eq!(guards.tracked_users(), 0);
    }
}
