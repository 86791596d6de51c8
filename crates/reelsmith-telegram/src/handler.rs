// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update filtering and translation into dialogue events.
//!
//! Decides whether an update should reach the dialogue engine at all
//! (private chat, allow-list) and maps commands, button presses and
//! uploaded files onto [`Event`] values.

use std::path::Path;

use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatKind, User};
use tracing::debug;

use reelsmith_core::{Event, InboundEvent, ReelsmithError, UserId, Workflow};

use crate::media;

pub const CB_MENU_SEO: &str = "menu_seo";
pub const CB_MENU_LOGO: &str = "menu_logo";
pub const CB_MENU_BANNER: &str = "menu_banner";
pub const CB_MENU_UPLOAD: &str = "menu_upload";
pub const CB_MENU_PROFILE: &str = "menu_profile";
pub const CB_MENU_STATS: &str = "menu_stats";
pub const CB_MENU_HOME: &str = "menu_back";
pub const CB_CONFIRM: &str = "confirm";
pub const CB_REJECT: &str = "reject";
pub const CB_BACK: &str = "back";
pub const CB_CANCEL: &str = "cancel";

/// Checks the sender against the allow-list.
///
/// Entries match the numeric user id or the username (with or without `@`,
/// case-insensitive). An empty list admits everyone. Updates without a
/// sender are never authorized.
pub fn is_authorized(user: Option<&User>, allowed_users: &[String]) -> bool {
    let Some(user) = user else {
        return false;
    };
    if allowed_users.is_empty() {
        return true;
    }

    let user_id = user.id.0.to_string();
    allowed_users.iter().any(|allowed| {
        if *allowed == user_id {
            return true;
        }
        let allowed = allowed.strip_prefix('@').unwrap_or(allowed);
        user.username
            .as_deref()
            .is_some_and(|username| username.eq_ignore_ascii_case(allowed))
    })
}

/// Group, supergroup and channel messages return `false`.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Maps message text to an event.
///
/// Known commands become their event, plain text becomes [`Event::Text`].
/// Unknown commands return `None`. A `@botname` suffix on a command is ignored.
pub fn text_event(text: &str) -> Option<Event> {
    let Some(command) = text.trim().strip_prefix('/') else {
        return Some(Event::Text(text.to_string()));
    };
    let name = command
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .split('@')
        .next()
        .unwrap_or_default();

    match name.to_ascii_lowercase().as_str() {
        "start" | "help" => Some(Event::Home),
        "myinfo" => Some(Event::Profile),
        "statistics" => Some(Event::Statistics),
        "seo" => Some(Event::Start(Workflow::Seo)),
        "logo" => Some(Event::Start(Workflow::Logo)),
        "banner" => Some(Event::Start(Workflow::Banner)),
        "upload" => Some(Event::Start(Workflow::Upload)),
        "cancel" => Some(Event::Cancel),
        other => {
            debug!(command = other, "ignoring unknown command");
            None
        }
    }
}

/// Maps inline keyboard callback data to an event.
pub fn callback_event(data: &str) -> Option<Event> {
    Some(match data {
        CB_MENU_SEO => Event::Start(Workflow::Seo),
        CB_MENU_LOGO => Event::Start(Workflow::Logo),
        CB_MENU_BANNER => Event::Start(Workflow::Banner),
        CB_MENU_UPLOAD => Event::Start(Workflow::Upload),
        CB_MENU_PROFILE => Event::Profile,
        CB_MENU_STATS => Event::Statistics,
        CB_MENU_HOME => Event::Home,
        CB_CONFIRM => Event::Confirm,
        CB_REJECT => Event::Reject,
        CB_BACK => Event::Back,
        CB_CANCEL => Event::Cancel,
        _ => return None,
    })
}

/// Extracts the event carried by a message.
///
/// Videos and documents are downloaded into `uploads_dir` first. Photos,
/// stickers and other message types return `None`.
pub async fn message_event(
    bot: &Bot,
    msg: &Message,
    uploads_dir: &Path,
) -> Result<Option<Event>, ReelsmithError> {
    if let Some(text) = msg.text() {
        return Ok(text_event(text));
    }

    if let Some(video) = msg.video() {
        let artifact = media::download(
            bot,
            &video.file,
            video.file_name.as_deref(),
            video.mime_type.as_ref().map(|m| m.to_string()),
            uploads_dir,
        )
        .await?;
        return Ok(Some(Event::File(artifact)));
    }

    if let Some(doc) = msg.document() {
        let artifact = media::download(
            bot,
            &doc.file,
            doc.file_name.as_deref(),
            doc.mime_type.as_ref().map(|m| m.to_string()),
            uploads_dir,
        )
        .await?;
        return Ok(Some(Event::File(artifact)));
    }

    debug!(msg_id = msg.id.0, "ignoring unsupported message type");
    Ok(None)
}

/// Wraps an event with its routing identity.
pub fn inbound(user: &User, chat_id: ChatId, event: Event) -> InboundEvent {
    InboundEvent {
        user_id: UserId(user.id.0.to_string()),
        chat_id: chat_id.0.to_string(),
        event,
    }
}
