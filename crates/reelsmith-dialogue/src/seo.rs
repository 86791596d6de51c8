// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort extraction of SEO metadata from text-generator output.
//!
//! Models are asked for a JSON object but often wrap it in prose or code
//! fences, or answer in plain text. Extraction never fails: anything that
//! cannot be read as metadata falls back to the topic as title and the raw
//! text as description.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use reelsmith_core::types::{SeoMetadata, VideoMetadata};

/// Maximum title length accepted by the video host, in characters.
pub const TITLE_LIMIT: usize = 100;

/// Tags used when the generator returned none.
pub const FALLBACK_TAGS: [&str; 2] = ["youtube", "video"];

/// Outermost `{ ... }` span, across lines.
static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("JSON object pattern is valid"));

/// Reads title, description and tags out of `raw`, or falls back.
pub fn extract_metadata(raw: &str, topic: &str) -> SeoMetadata {
    let parsed = JSON_OBJECT
        .find(raw)
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .filter(Value::is_object);

    let Some(object) = parsed else {
        return fallback(raw, topic);
    };

    let title = string_field(&object, "title").unwrap_or_else(|| topic.to_string());
    let description = string_field(&object, "description").unwrap_or_default();
    let tags = tags_field(&object);

    SeoMetadata {
        title: truncate_chars(&title, TITLE_LIMIT),
        description,
        tags: if tags.is_empty() { fallback_tags() } else { tags },
    }
}

fn fallback(raw: &str, topic: &str) -> SeoMetadata {
    SeoMetadata {
        title: truncate_chars(topic, TITLE_LIMIT),
        description: raw.trim().to_string(),
        tags: fallback_tags(),
    }
}

fn fallback_tags() -> Vec<String> {
    FALLBACK_TAGS.iter().map(|t| t.to_string()).collect()
}

fn string_field(object: &Value, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Tags come back either as an array of strings or as one comma-separated string.
fn tags_field(object: &Value) -> Vec<String> {
    let raw: Vec<String> = match object.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Normalizes one tag for use as a hashtag: no whitespace, no apostrophes,
/// no leading `#`. Returns `None` when nothing is left.
pub fn clean_tag(tag: &str) -> Option<String> {
    let cleaned: String = tag
        .trim()
        .trim_start_matches('#')
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '\'' | '\u{2019}' | '\u{02BC}'))
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Appends `tags` as hashtags to `description`, separated by a blank line.
pub fn compose_description(description: &str, tags: &[String]) -> String {
    if tags.is_empty() {
        return description.to_string();
    }
    let hashtags = tags
        .iter()
        .map(|t| format!("#{t}"))
        .collect::<Vec<_>>()
        .join(" ");
    if description.is_empty() {
        hashtags
    } else {
        format!("{description}\n\n{hashtags}")
    }
}

/// Upload metadata for a video: title within the host's limit, cleaned tags,
/// and the tags repeated as hashtags at the end of the description.
pub fn video_metadata(seo: &SeoMetadata) -> VideoMetadata {
    let mut tags: Vec<String> = Vec::new();
    for tag in seo.tags.iter().filter_map(|t| clean_tag(t)) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    VideoMetadata {
        title: truncate_chars(&seo.title, TITLE_LIMIT),
        description: compose_description(&seo.description, &tags),
        tags,
    }
}

/// First `limit` characters of `s`.
pub fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}
