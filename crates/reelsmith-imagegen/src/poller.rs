// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Submit-once, poll-on-a-fixed-interval driver for asynchronous task APIs.
//!
//! The poller never returns an error. Submission failures, poll failures,
//! reported task failures and an exhausted attempt budget all become
//! [`TerminalResult::Failure`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use reelsmith_core::{ReelsmithError, TerminalResult};

/// Status of a submitted task as reported by the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Still queued or running.
    Pending,
    /// Finished; carries the result references in the order reported.
    Succeeded(Vec<String>),
    /// Finished without a result.
    Failed(String),
}

/// An API that accepts a task and reports its status by id.
#[async_trait]
pub trait TaskEndpoint: Send + Sync {
    type Request: Send + Sync;

    /// Submits the task and returns its opaque id.
    async fn submit(&self, request: &Self::Request) -> Result<String, ReelsmithError>;

    async fn status(&self, task_id: &str) -> Result<TaskStatus, ReelsmithError>;
}

/// Interval and attempt budget for polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskPoller {
    policy: PollPolicy,
}

impl TaskPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Submits `request` and polls until a terminal status or the budget runs out.
    pub async fn run<E>(&self, endpoint: &E, request: &E::Request) -> TerminalResult
    where
        E: TaskEndpoint + ?Sized,
    {
        let task_id = match endpoint.submit(request).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "task submission failed");
                return TerminalResult::Failure(format!("submission failed: {e}"));
            }
        };
        info!(task_id = task_id.as_str(), "task submitted");

        for attempt in 1..=self.policy.max_attempts {
            match endpoint.status(&task_id).await {
                Ok(TaskStatus::Succeeded(references)) => {
                    info!(task_id = task_id.as_str(), attempt, "task succeeded");
                    return match references.into_iter().next() {
                        Some(reference) => TerminalResult::Success(reference),
                        None => TerminalResult::Failure(
                            "task succeeded without a result reference".into(),
                        ),
                    };
                }
                Ok(TaskStatus::Failed(reason)) => {
                    warn!(task_id = task_id.as_str(), attempt, reason = reason.as_str(), "task failed");
                    return TerminalResult::Failure(reason);
                }
                Ok(TaskStatus::Pending) => {
                    debug!(task_id = task_id.as_str(), attempt, "task pending");
                }
                Err(e) => {
                    warn!(task_id = task_id.as_str(), attempt, error = %e, "status poll failed");
                    return TerminalResult::Failure(format!("status poll failed: {e}"));
                }
            }
            tokio::time::sleep(self.policy.interval).await;
        }

        warn!(
            task_id = task_id.as_str(),
            attempts = self.policy.max_attempts,
            "task did not finish in time"
        );
        TerminalResult::Failure(format!(
            "timeout: task {task_id} did not finish after {} polls",
            self.policy.max_attempts
        ))
    }
}
