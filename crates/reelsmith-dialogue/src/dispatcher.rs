// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dispatch loop: one task per inbound event.
//!
//! Events for different users run concurrently. Events for the same user
//! are serialized by the orchestrator's per-user lock and answered `Busy`
//! while a confirmed operation is running.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use reelsmith_core::{ChannelAdapter, InboundEvent, OutboundMessage, ReelsmithError};

use crate::orchestrator::Orchestrator;

/// How long shutdown waits for running operations by default.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Dispatcher {
    channel: Arc<dyn ChannelAdapter>,
    orchestrator: Arc<Orchestrator>,
    tracker: TaskTracker,
    drain_timeout: Duration,
}

impl Dispatcher {
    pub fn new(channel: Arc<dyn ChannelAdapter>, orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            channel,
            orchestrator,
            tracker: TaskTracker::new(),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Receives and dispatches events until `cancel` fires or the channel closes,
    /// then waits up to the drain timeout for running tasks.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), ReelsmithError> {
        info!("dispatcher running");

        loop {
            tokio::select! {
                received = self.channel.receive() => {
                    match received {
                        Ok(inbound) => self.dispatch(inbound),
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping dispatcher");
                    break;
                }
            }
        }

        self.drain().await;
        info!("dispatcher stopped");
        Ok(())
    }

    fn dispatch(&self, inbound: InboundEvent) {
        let channel = Arc::clone(&self.channel);
        let orchestrator = Arc::clone(&self.orchestrator);
        self.tracker.spawn(async move {
            let InboundEvent {
                user_id,
                chat_id,
                event,
            } = inbound;
            debug!(user_id = %user_id, "dispatching event");
            let effect = orchestrator.handle(&user_id, event).await;
            if let Err(e) = channel.send(OutboundMessage { chat_id, effect }).await {
                error!(user_id = %user_id, error = %e, "failed to deliver effect");
            }
        });
    }

    async fn drain(&self) {
        self.tracker.close();
        let running = self.tracker.len();
        if running == 0 {
            info!("no running tasks to drain");
            return;
        }
        info!(count = running, "waiting for running tasks to complete");
        match tokio::time::timeout(self.drain_timeout, self.tracker.wait()).await {
            Ok(()) => info!("all tasks drained"),
            Err(_) => warn!(
                remaining = self.tracker.len(),
                "drain timeout reached, abandoning running tasks"
            ),
        }
    }
}
