// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Reelsmith configuration system.

use reelsmith_config::diagnostic::ConfigError;
use reelsmith_config::model::ReelsmithConfig;
use reelsmith_config::{load_and_validate_str, load_config_from_path, load_config_from_str};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[bot]
name = "studio"
log_level = "debug"
language = "ru"
work_dir = "/var/lib/reelsmith/work"

[telegram]
bot_token = "123:ABC"
allowed_users = ["alice", "42"]

[storage]
database_path = "/tmp/test.db"
wal_mode = false

[openai]
api_key = "sk-123"
model = "gpt-4o"
temperature = 0.2

[imagegen]
api_key = "kie-123"
poll_interval_secs = 5
max_poll_attempts = 10

[youtube]
access_token = "ya29.token"
chunk_size_bytes = 1048576
privacy_status = "unlisted"
attach_thumbnails = true
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.bot.name, "studio");
    assert_eq!(config.bot.log_level, "debug");
    assert_eq!(config.bot.language, "ru");
    assert_eq!(config.bot.work_dir, "/var/lib/reelsmith/work");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.allowed_users, vec!["alice", "42"]);
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.openai.model, "gpt-4o");
    assert!((config.openai.temperature - 0.2).abs() < f64::EPSILON);
    assert_eq!(config.imagegen.poll_interval_secs, 5);
    assert_eq!(config.imagegen.max_poll_attempts, 10);
    assert_eq!(config.youtube.chunk_size_bytes, 1_048_576);
    assert_eq!(config.youtube.privacy_status, "unlisted");
    assert!(config.youtube.attach_thumbnails);
}

/// Missing sections use defaults without error.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.bot.name, "reelsmith");
    assert_eq!(config.bot.log_level, "info");
    assert_eq!(config.bot.language, "en");
    assert!(config.telegram.bot_token.is_none());
    assert!(config.telegram.allowed_users.is_empty());
    assert!(config.storage.database_path.ends_with("reelsmith.db"));
    assert!(config.storage.wal_mode);
    assert_eq!(config.openai.model, "gpt-4o-mini");
    assert!((config.openai.temperature - 0.7).abs() < f64::EPSILON);
    assert_eq!(config.imagegen.base_url, "https://api.kie.ai");
    assert_eq!(config.imagegen.poll_interval_secs, 2);
    assert_eq!(config.imagegen.max_poll_attempts, 60);
    assert_eq!(config.youtube.category_id, "22");
    assert_eq!(config.youtube.privacy_status, "public");
    assert_eq!(config.youtube.chunk_size_bytes, 8 * 1024 * 1024);
    assert!(!config.youtube.attach_thumbnails);
}

#[test]
fn unknown_field_in_imagegen_produces_error() {
    let toml = r#"
[imagegen]
poll_intervl_secs = 3
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("poll_intervl_secs"),
        "error should mention unknown field, got: {err_str}"
    );
}

#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[logging]
level = "debug"
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    assert!(format!("{err}").contains("logging") || format!("{err}").contains("unknown field"));
}

/// Dotted overrides behave like the REELSMITH_ env provider's mapped keys.
#[test]
fn dotted_override_reaches_nested_key() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: ReelsmithConfig = Figment::new()
        .merge(Serialized::defaults(ReelsmithConfig::default()))
        .merge(Toml::string("[youtube]\nmax_chunk_retries = 2\n"))
        .merge(("youtube.max_chunk_retries", 9))
        .merge(("telegram.bot_token", "xyz-from-env"))
        .extract()
        .expect("should merge overrides");

    assert_eq!(config.youtube.max_chunk_retries, 9);
    assert_eq!(config.telegram.bot_token.as_deref(), Some("xyz-from-env"));
}

#[test]
#[serial_test::serial]
fn env_var_overrides_file_value() {
    let dir = std::env::temp_dir().join(format!("reelsmith-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("reelsmith.toml");
    std::fs::write(&path, "[bot]\nlanguage = \"de\"\n").expect("write config");

    // SAFETY: serialized test; no other thread reads the environment concurrently.
    unsafe { std::env::set_var("REELSMITH_BOT_LANGUAGE", "fr") };
    let result = load_config_from_path(&path);
    unsafe { std::env::remove_var("REELSMITH_BOT_LANGUAGE") };
    let _ = std::fs::remove_dir_all(&dir);

    let config = result.expect("config should load");
    assert_eq!(config.bot.language, "fr");
}

#[test]
fn diagnostic_error_includes_unknown_key_and_suggestion() {
    let toml = r#"
[bot]
naem = "test"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "naem"
                && suggestion.as_deref() == Some("name")
                && valid_keys.contains("work_dir")
        })
    });
    assert!(found, "expected UnknownKey for `naem`, got: {errors:?}");
}

#[test]
fn diagnostic_invalid_type_names_the_key() {
    let toml = r#"
[imagegen]
max_poll_attempts = "many"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors.iter().any(|e| matches!(
            e,
            ConfigError::InvalidType { key, .. } if key.contains("max_poll_attempts")
        )),
        "got: {errors:?}"
    );
}

#[test]
fn validation_errors_are_collected() {
    let toml = r#"
[bot]
log_level = "loud"

[youtube]
privacy_status = "hidden"
chunk_size_bytes = 100
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 3, "got: {errors:?}");
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "naem".to_string(),
        suggestion: Some("name".to_string()),
        valid_keys: "name, log_level, language, work_dir".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some());
    let help = error.help().expect("help text").to_string();
    assert!(help.contains("did you mean `name`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("naem"));
}
