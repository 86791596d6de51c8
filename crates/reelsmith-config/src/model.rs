// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Chunk sizes for resumable uploads must be a multiple of this.
pub const UPLOAD_CHUNK_GRANULARITY: u64 = 256 * 1024;

/// Top-level Reelsmith configuration.
///
/// All sections are optional and default to sensible values; credentials
/// default to `None` and are checked by the command that needs them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReelsmithConfig {
    #[serde(default)]
    pub bot: BotConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Text generation (SEO metadata).
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Asynchronous image generation (logos and banners).
    #[serde(default)]
    pub imagegen: ImageGenConfig,

    /// Video hosting (resumable upload and thumbnails).
    #[serde(default)]
    pub youtube: YoutubeConfig,
}

/// Bot identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name used in greetings and logs.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Language requested from the text generator.
    #[serde(default = "default_language")]
    pub language: String,

    /// Directory for downloaded videos and rendered thumbnails.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
            language: default_language(),
            work_dir: default_work_dir(),
        }
    }
}

fn default_bot_name() -> String {
    "reelsmith".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_work_dir() -> String {
    data_path("work")
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `serve`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Allowed Telegram user ids or usernames. Empty allows everyone.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Keep conversation cursors in SQLite so they survive a restart.
    /// When false they live in process memory only.
    #[serde(default = "default_persist_conversations")]
    pub persist_conversations: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            persist_conversations: default_persist_conversations(),
        }
    }
}

fn default_database_path() -> String {
    data_path("reelsmith.db")
}

fn default_wal_mode() -> bool {
    true
}

fn default_persist_conversations() -> bool {
    true
}

/// OpenAI-compatible chat completions configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. Required by `serve`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_openai_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            temperature: default_temperature(),
            timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Image generation task API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImageGenConfig {
    /// API key. Required by `serve`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_imagegen_base_url")]
    pub base_url: String,

    #[serde(default = "default_imagegen_model")]
    pub model: String,

    /// Let the API translate non-English prompts.
    #[serde(default = "default_enable_translation")]
    pub enable_translation: bool,

    /// Seconds between status polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Polls before a task is reported as timed out.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

impl Default for ImageGenConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_imagegen_base_url(),
            model: default_imagegen_model(),
            enable_translation: default_enable_translation(),
            poll_interval_secs: default_poll_interval_secs(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

fn default_imagegen_base_url() -> String {
    "https://api.kie.ai".to_string()
}

fn default_imagegen_model() -> String {
    "gpt4o-image".to_string()
}

fn default_enable_translation() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_max_poll_attempts() -> u32 {
    60
}

/// YouTube Data API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct YoutubeConfig {
    /// OAuth access token. Obtaining it is outside Reelsmith. Required by `serve`.
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_youtube_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_youtube_upload_base_url")]
    pub upload_base_url: String,

    /// Bytes per upload chunk; a positive multiple of 256 KiB.
    #[serde(default = "default_chunk_size_bytes")]
    pub chunk_size_bytes: u64,

    /// Retries for one chunk after a transient failure.
    #[serde(default = "default_max_chunk_retries")]
    pub max_chunk_retries: u32,

    #[serde(default = "default_category_id")]
    pub category_id: String,

    /// One of `public`, `unlisted`, `private`.
    #[serde(default = "default_privacy_status")]
    pub privacy_status: String,

    /// Render a plate and set it as the thumbnail of each upload. When off,
    /// YouTube keeps the frame it picks itself.
    #[serde(default)]
    pub attach_thumbnails: bool,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            api_base_url: default_youtube_api_base_url(),
            upload_base_url: default_youtube_upload_base_url(),
            chunk_size_bytes: default_chunk_size_bytes(),
            max_chunk_retries: default_max_chunk_retries(),
            category_id: default_category_id(),
            privacy_status: default_privacy_status(),
            attach_thumbnails: false,
        }
    }
}

fn default_youtube_api_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_youtube_upload_base_url() -> String {
    "https://www.googleapis.com/upload/youtube/v3".to_string()
}

fn default_chunk_size_bytes() -> u64 {
    32 * UPLOAD_CHUNK_GRANULARITY
}

fn default_max_chunk_retries() -> u32 {
    5
}

fn default_category_id() -> String {
    "22".to_string()
}

fn default_privacy_status() -> String {
    "public".to_string()
}

fn data_path(name: &str) -> String {
    dirs::data_dir()
        .map(|p| p.join("reelsmith").join(name))
        .unwrap_or_else(|| std::path::PathBuf::from(name))
        .to_string_lossy()
        .into_owned()
}
