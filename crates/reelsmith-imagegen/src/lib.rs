// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image generation collaborator for Reelsmith.
//!
//! [`KieImageGenerator`] runs each [`ImageRequest`] through the generic
//! [`TaskPoller`] against the KIE task API.

pub mod kie;
pub mod poller;

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use reelsmith_config::model::ImageGenConfig;
use reelsmith_core::types::ImageRequest;
use reelsmith_core::{
    AdapterType, HealthStatus, ImageGenerator, PluginAdapter, ReelsmithError, TerminalResult,
};

pub use kie::KieClient;
pub use poller::{PollPolicy, TaskEndpoint, TaskPoller, TaskStatus};

pub struct KieImageGenerator {
    endpoint: KieClient,
    poller: TaskPoller,
}

impl KieImageGenerator {
    pub fn new(config: &ImageGenConfig) -> Result<Self, ReelsmithError> {
        let endpoint = KieClient::new(config)?;
        let policy = PollPolicy {
            interval: Duration::from_secs(config.poll_interval_secs),
            max_attempts: config.max_poll_attempts,
        };
        info!(
            model = config.model.as_str(),
            interval_secs = config.poll_interval_secs,
            max_attempts = config.max_poll_attempts,
            "image generator initialized"
        );
        Ok(Self {
            endpoint,
            poller: TaskPoller::new(policy),
        })
    }
}

#[async_trait]
impl PluginAdapter for KieImageGenerator {
    fn name(&self) -> &str {
        "kie-gpt4o-image"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ImageGenerator
    }

    async fn health_check(&self) -> Result<HealthStatus, ReelsmithError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReelsmithError> {
        Ok(())
    }
}

#[async_trait]
impl ImageGenerator for KieImageGenerator {
    async fn generate(&self, request: ImageRequest) -> TerminalResult {
        self.poller.run(&self.endpoint, &request).await
    }
}
