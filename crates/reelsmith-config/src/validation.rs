// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::{ReelsmithConfig, UPLOAD_CHUNK_GRANULARITY};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const PRIVACY_STATUSES: &[&str] = &["public", "unlisted", "private"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &ReelsmithConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.bot.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "bot.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.bot.log_level
        )));
    }

    if config.bot.language.trim().is_empty() {
        errors.push(ConfigError::validation("bot.language must not be empty"));
    }

    if config.bot.work_dir.trim().is_empty() {
        errors.push(ConfigError::validation("bot.work_dir must not be empty"));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if !(0.0..=2.0).contains(&config.openai.temperature) {
        errors.push(ConfigError::validation(format!(
            "openai.temperature must be between 0 and 2, got {}",
            config.openai.temperature
        )));
    }

    if config.imagegen.poll_interval_secs == 0 {
        errors.push(ConfigError::validation(
            "imagegen.poll_interval_secs must be at least 1",
        ));
    }

    if config.imagegen.max_poll_attempts == 0 {
        errors.push(ConfigError::validation(
            "imagegen.max_poll_attempts must be at least 1",
        ));
    }

    let chunk = config.youtube.chunk_size_bytes;
    if chunk == 0 || chunk % UPLOAD_CHUNK_GRANULARITY != 0 {
        errors.push(ConfigError::validation(format!(
            "youtube.chunk_size_bytes must be a positive multiple of {UPLOAD_CHUNK_GRANULARITY}, got {chunk}"
        )));
    }

    if !PRIVACY_STATUSES.contains(&config.youtube.privacy_status.as_str()) {
        errors.push(ConfigError::validation(format!(
            "youtube.privacy_status must be one of {}, got `{}`",
            PRIVACY_STATUSES.join(", "),
            config.youtube.privacy_status
        )));
    }

    for (name, url) in [
        ("openai.base_url", &config.openai.base_url),
        ("imagegen.base_url", &config.imagegen.base_url),
        ("youtube.api_base_url", &config.youtube.api_base_url),
        ("youtube.upload_base_url", &config.youtube.upload_base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::validation(format!(
                "{name} must be an http(s) URL, got `{url}`"
            )));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Checks the credentials `serve` needs; other commands run without them.
pub fn require_credentials(config: &ReelsmithConfig) -> Result<(), Vec<ConfigError>> {
    let missing: Vec<ConfigError> = [
        ("telegram.bot_token", config.telegram.bot_token.is_some()),
        ("openai.api_key", config.openai.api_key.is_some()),
        ("imagegen.api_key", config.imagegen.api_key.is_some()),
        ("youtube.access_token", config.youtube.access_token.is_some()),
    ]
    .into_iter()
    .filter(|(_, present)| !present)
    .map(|(key, _)| ConfigError::MissingKey {
        key: key.to_string(),
    })
    .collect();

    if missing.is_empty() { Ok(()) } else { Err(missing) }
}
