// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation vocabulary shared by the dialogue engine, the stores and the
//! chat adapters: where a user is in a workflow, what they sent, and what the
//! engine answers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::{
    Artifact, ChannelStats, JobCounts, JobId, JobKind, SeoMetadata, TerminalResult, User, UserId,
};

/// A guided dialogue the user can enter from the menu.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    Seo,
    Logo,
    Banner,
    Upload,
}

/// One step inside a workflow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Step {
    TopicPending,
    FilePending,
    DescriptionPending,
    StylePending,
    ConfirmationPending,
}

/// Name of a value collected by a text step.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Topic,
    Description,
    Style,
}

/// Position inside an active workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub workflow: Workflow,
    pub step: Step,
}

/// Per-user dialogue cursor plus the fields collected so far.
///
/// `cursor == None` means no active workflow; in that state `fields` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub cursor: Option<Cursor>,
    pub fields: BTreeMap<Field, String>,
}

impl ConversationState {
    /// The idle state: no workflow, no fields.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Enters `step` of `workflow` with no collected fields.
    pub fn at(workflow: Workflow, step: Step) -> Self {
        Self {
            cursor: Some(Cursor { workflow, step }),
            fields: BTreeMap::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.cursor.is_none()
    }

    pub fn workflow(&self) -> Option<Workflow> {
        self.cursor.map(|c| c.workflow)
    }

    pub fn step(&self) -> Option<Step> {
        self.cursor.map(|c| c.step)
    }

    pub fn field(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn with_field(mut self, field: Field, value: impl Into<String>) -> Self {
        self.fields.insert(field, value.into());
        self
    }
}

/// A user action delivered by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Menu selection or command entering a workflow.
    Start(Workflow),
    /// Return to the top-level menu.
    Home,
    /// Show the user's profile and job counts.
    Profile,
    /// Show statistics of the linked YouTube channel.
    Statistics,
    Text(String),
    File(Artifact),
    Confirm,
    Reject,
    Cancel,
    Back,
}

/// An event tagged with the user and the chat it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub user_id: UserId,
    pub chat_id: String,
    pub event: Event,
}

/// What the engine answers to one event. Rendering is the channel's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Top-level menu.
    Menu { connected: bool },
    /// Profile summary for `/myinfo`.
    Profile { user: User, counts: JobCounts },
    /// Channel statistics for `/statistics`.
    Statistics { stats: ChannelStats },
    /// The video host could not report channel statistics.
    StatisticsUnavailable { reason: String },
    /// Ask for the value of the next step.
    Prompt { workflow: Workflow, step: Step },
    /// Show the collected inputs and ask for confirm/reject.
    ConfirmationRequested {
        workflow: Workflow,
        description: String,
        style: String,
    },
    /// Empty or whitespace-only text; the step is asked again.
    EmptyInput { step: Step },
    /// The event does not apply to the current step.
    Ignored,
    Cancelled,
    Rejected,
    /// A confirmed operation is already running for this user.
    Busy,
    /// Transient SEO run finished.
    SeoReady { topic: String, metadata: SeoMetadata },
    /// Transient SEO run could not reach the text generator.
    SeoFailed { reason: String },
    /// A persisted job reached a terminal status.
    JobFinished {
        job_id: JobId,
        kind: JobKind,
        outcome: TerminalResult,
        note: Option<String>,
        /// The terminal status could not be written to the job store.
        unrecorded: bool,
    },
    /// A storage failure stopped the step before any external work started.
    Aborted { reason: String },
}

/// An effect addressed to a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: String,
    pub effect: Effect,
}
