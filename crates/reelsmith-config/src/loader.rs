// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./reelsmith.toml` > `~/.config/reelsmith/reelsmith.toml` >
//! `/etc/reelsmith/reelsmith.toml`, with `REELSMITH_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ReelsmithConfig;

const SYSTEM_CONFIG: &str = "/etc/reelsmith/reelsmith.toml";
const LOCAL_CONFIG: &str = "reelsmith.toml";

/// Config sections addressable through `REELSMITH_<SECTION>_<KEY>`.
const ENV_SECTIONS: &[&str] = &["bot", "telegram", "storage", "openai", "imagegen", "youtube"];

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/reelsmith/reelsmith.toml`
/// 3. `~/.config/reelsmith/reelsmith.toml`
/// 4. `./reelsmith.toml`
/// 5. `REELSMITH_*` environment variables
pub fn load_config() -> Result<ReelsmithConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string over the defaults (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ReelsmithConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReelsmithConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ReelsmithConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReelsmithConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    config_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(ReelsmithConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Config file locations, lowest precedence first.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("reelsmith").join(LOCAL_CONFIG));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG));
    paths
}

/// Environment provider with explicit section mapping.
///
/// `REELSMITH_YOUTUBE_CHUNK_SIZE_BYTES` must become `youtube.chunk_size_bytes`,
/// so keys are split only after a known section prefix, never on every `_`.
fn env_provider() -> Env {
    Env::prefixed("REELSMITH_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    ENV_SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|field| format!("{section}.{field}"))
        })
        .unwrap_or_else(|| key.to_string())
}
