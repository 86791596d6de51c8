// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for chat transports (Telegram).

use async_trait::async_trait;

use crate::conversation::{InboundEvent, OutboundMessage};
use crate::error::ReelsmithError;
use crate::traits::adapter::PluginAdapter;
use crate::types::MessageId;

/// Adapter for a bidirectional chat transport.
///
/// The channel turns platform updates (text, files, button presses) into
/// [`InboundEvent`]s and renders [`Effect`](crate::conversation::Effect)s back
/// to the user.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), ReelsmithError>;

    /// Renders and sends an effect to a chat.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ReelsmithError>;

    /// Receives the next inbound event from the channel.
    async fn receive(&self) -> Result<InboundEvent, ReelsmithError>;
}
