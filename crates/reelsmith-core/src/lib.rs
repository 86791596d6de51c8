// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Reelsmith.
//!
//! This crate provides the error type, the job and conversation domain types,
//! and the adapter traits shared by the dialogue engine, the storage backend,
//! the chat transport and the external collaborators.

pub mod conversation;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use conversation::{
    ConversationState, Cursor, Effect, Event, Field, InboundEvent, OutboundMessage, Step,
    Workflow,
};
pub use error::ReelsmithError;
pub use types::{
    AdapterType, Artifact, ChannelStats, HealthStatus, Job, JobId, JobKind, JobPayload, JobStatus,
    JobUpdate, MessageId, NewJob, TerminalResult, User, UserId, VideoStats,
};

pub use traits::{
    ChannelAdapter, ConversationStore, ImageGenerator, JobStore, PluginAdapter, StorageAdapter,
    TextGenerator, ThumbnailRenderer, VideoHost,
};
