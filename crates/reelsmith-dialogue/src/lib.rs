// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialogue engine for Reelsmith.
//!
//! - [`fsm`]: the pure conversation state machine
//! - [`orchestrator`]: runs completed dialogues against the job store and collaborators
//! - [`dispatcher`]: the per-event task loop between a channel and the orchestrator
//! - [`shutdown`]: signal handling

pub mod dispatcher;
pub mod fsm;
pub mod guard;
pub mod memory;
pub mod orchestrator;
pub mod prompts;
pub mod seo;
pub mod shutdown;

pub use dispatcher::Dispatcher;
pub use fsm::{Signal, Submission, Transition, advance};
pub use memory::MemoryConversationStore;
pub use orchestrator::{Collaborators, Orchestrator, OrchestratorSettings};
