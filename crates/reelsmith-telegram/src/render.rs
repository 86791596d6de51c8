// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns dialogue effects into Telegram text and inline keyboards.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use reelsmith_core::{ChannelStats, Effect, JobKind, Step, TerminalResult, Workflow};

use crate::handler::{
    CB_BACK, CB_CANCEL, CB_CONFIRM, CB_MENU_BANNER, CB_MENU_HOME, CB_MENU_LOGO, CB_MENU_PROFILE,
    CB_MENU_SEO, CB_MENU_STATS, CB_MENU_UPLOAD, CB_REJECT,
};

/// Telegram's limit for one text message.
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Rendered {
    fn new(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        let text: String = text.into();
        let text = if text.chars().count() > MAX_MESSAGE_CHARS {
            text.chars().take(MAX_MESSAGE_CHARS).collect()
        } else {
            text
        };
        Self {
            text,
            keyboard: Some(keyboard),
        }
    }
}

/// Renders `effect`, or returns `None` when nothing should be sent.
pub fn render(effect: &Effect) -> Option<Rendered> {
    let rendered = match effect {
        Effect::Ignored => return None,
        Effect::Menu { connected } => Rendered::new(
            format!(
                "Choose a tool.\n\nYouTube account: {}",
                if *connected { "linked" } else { "not linked" }
            ),
            main_menu(),
        ),
        Effect::Profile { user, counts } => Rendered::new(
            format!(
                "Your profile\n\nID: {}\nYouTube account: {}\nJobs: {} total, {} completed, {} failed\nMember since: {}",
                user.id,
                if user.connected { "linked" } else { "not linked" },
                counts.total,
                counts.completed,
                counts.failed,
                user.created_at
            ),
            home_only(),
        ),
        Effect::Statistics { stats } => Rendered::new(statistics_text(stats), home_only()),
        Effect::StatisticsUnavailable { reason } => Rendered::new(
            format!("Could not load channel statistics: {reason}"),
            home_only(),
        ),
        Effect::Prompt { workflow, step } => {
            Rendered::new(prompt_text(*workflow, *step), back_and_cancel())
        }
        Effect::ConfirmationRequested {
            workflow,
            description,
            style,
        } => Rendered::new(
            format!(
                "{} request\n\nTheme: {description}\n{}: {style}\n\nGenerate it?",
                capitalized(*workflow),
                style_label(*workflow),
            ),
            confirmation(),
        ),
        Effect::EmptyInput { step } => Rendered::new(
            match step {
                Step::FilePending => "Please send a video file.",
                Step::ConfirmationPending => "Please use the buttons to confirm or reject.",
                _ => "The message is empty. Please send some text.",
            },
            back_and_cancel(),
        ),
        Effect::Cancelled => Rendered::new("Cancelled.", main_menu()),
        Effect::Rejected => Rendered::new("Okay, nothing was generated.", main_menu()),
        Effect::Busy => Rendered::new(
            "Your previous request is still running. Please wait for it to finish.",
            home_only(),
        ),
        Effect::SeoReady { topic, metadata } => Rendered::new(
            format!(
                "SEO for \"{topic}\"\n\nTitle:\n{}\n\nDescription:\n{}\n\nTags:\n{}",
                metadata.title,
                metadata.description,
                metadata.tags.join(", ")
            ),
            home_only(),
        ),
        Effect::SeoFailed { reason } => {
            Rendered::new(format!("Could not generate SEO metadata: {reason}"), home_only())
        }
        Effect::JobFinished {
            job_id,
            kind,
            outcome,
            note,
            unrecorded,
        } => {
            let mut text = match outcome {
                TerminalResult::Success(reference) => success_text(*kind, reference),
                TerminalResult::Failure(reason) => {
                    format!("Job #{job_id} ({kind}) failed: {reason}")
                }
            };
            if let Some(note) = note {
                text.push_str(&format!("\n\nNote: {note}"));
            }
            if *unrecorded {
                text.push_str("\n\nThe result could not be saved to your history.");
            }
            Rendered::new(text, home_only())
        }
        Effect::Aborted { reason } => Rendered::new(
            format!("Something went wrong: {reason}. Please try again."),
            home_only(),
        ),
    };
    Some(rendered)
}

fn prompt_text(workflow: Workflow, step: Step) -> &'static str {
    match (workflow, step) {
        (Workflow::Seo, _) => "Send the topic of your video.",
        (Workflow::Upload, Step::TopicPending) => "Send the topic of the video you want to upload.",
        (Workflow::Upload, _) => "Now send the video file.",
        (Workflow::Logo, Step::DescriptionPending) => "What is your channel about?",
        (Workflow::Logo, _) => "Describe the logo style you want.",
        (Workflow::Banner, Step::DescriptionPending) => "What is your channel about?",
        (Workflow::Banner, _) => "Send the channel name to put on the banner.",
    }
}

fn statistics_text(stats: &ChannelStats) -> String {
    let mut text = format!(
        "Channel statistics\n\nName: {}\nSubscribers: {}\nViews: {}\nVideos: {}\nLikes: {}\nComments: {}",
        stats.title, stats.subscribers, stats.views, stats.videos, stats.likes, stats.comments
    );
    if !stats.recent.is_empty() {
        text.push_str("\n\nLatest uploads:");
        for video in &stats.recent {
            text.push_str(&format!(
                "\n\n{}\nViews {} | Likes {} | Comments {}",
                video.title, video.views, video.likes, video.comments
            ));
        }
    }
    text
}

fn success_text(kind: JobKind, reference: &str) -> String {
    match kind {
        JobKind::Logo => format!("Your logo is ready:\n{reference}"),
        JobKind::Banner => format!("Your banner is ready:\n{reference}"),
        JobKind::Video => format!("Video uploaded:\nhttps://youtu.be/{reference}"),
    }
}

fn capitalized(workflow: Workflow) -> &'static str {
    match workflow {
        Workflow::Seo => "SEO",
        Workflow::Logo => "Logo",
        Workflow::Banner => "Banner",
        Workflow::Upload => "Upload",
    }
}

fn style_label(workflow: Workflow) -> &'static str {
    match workflow {
        Workflow::Banner => "Channel name",
        _ => "Style",
    }
}

fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("SEO", CB_MENU_SEO),
            InlineKeyboardButton::callback("Upload video", CB_MENU_UPLOAD),
        ],
        vec![
            InlineKeyboardButton::callback("Logo", CB_MENU_LOGO),
            InlineKeyboardButton::callback("Banner", CB_MENU_BANNER),
        ],
        vec![
            InlineKeyboardButton::callback("My info", CB_MENU_PROFILE),
            InlineKeyboardButton::callback("Channel stats", CB_MENU_STATS),
        ],
    ])
}

fn back_and_cancel() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("Back", CB_BACK),
        InlineKeyboardButton::callback("Cancel", CB_CANCEL),
    ]])
}

fn confirmation() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("Yes", CB_CONFIRM),
            InlineKeyboardButton::callback("No", CB_REJECT),
        ],
        vec![InlineKeyboardButton::callback("Back", CB_BACK)],
    ])
}

fn home_only() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "Main menu",
        CB_MENU_HOME,
    )]])
}
