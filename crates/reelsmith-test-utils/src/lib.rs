// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Reelsmith integration tests.
//!
//! Provides mock adapters and a test harness for fast, deterministic tests
//! without external services.
//!
//! # Components
//!
//! - [`MockChannel`] - chat transport with event injection and capture
//! - [`MockTextGenerator`], [`MockImageGenerator`], [`MockVideoHost`],
//!   [`MockThumbnailRenderer`] - scripted collaborators
//! - [`FaultyJobStore`] - job store wrapper with switchable write failures
//! - [`TestHarness`] - orchestrator over a temp SQLite database

pub mod faulty_store;
pub mod harness;
pub mod mock_channel;
pub mod mock_collaborators;

pub use faulty_store::FaultyJobStore;
pub use harness::TestHarness;
pub use mock_channel::MockChannel;
pub use mock_collaborators::{
    Gate, MockImageGenerator, MockTextGenerator, MockThumbnailRenderer, MockVideoHost,
};
