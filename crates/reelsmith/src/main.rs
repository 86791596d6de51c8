// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reelsmith - a chat bot for YouTube creators.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use clap::{Parser, Subcommand};

use reelsmith_config::ReelsmithConfig;

/// Reelsmith - YouTube SEO, logos, banners and uploads over chat.
#[derive(Parser, Debug)]
#[command(name = "reelsmith", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot.
    Serve,
    /// Validate configuration and credentials, then exit.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match reelsmith_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            reelsmith_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(errors) = reelsmith_config::require_credentials(&config) {
                reelsmith_config::render_errors(&errors);
                std::process::exit(1);
            }
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::CheckConfig) => {
            if let Err(errors) = reelsmith_config::require_credentials(&config) {
                reelsmith_config::render_errors(&errors);
                std::process::exit(1);
            }
            println!("{}", config_summary(&config));
        }
        None => {
            println!("reelsmith: use --help for available commands");
        }
    }
}

fn config_summary(config: &ReelsmithConfig) -> String {
    format!(
        "config ok\n  bot: {} (language={}, work_dir={})\n  storage: {} (wal={}, persist_conversations={})\n  telegram: {} allowed user(s){}\n  openai: {}\n  imagegen: {} (poll every {}s, {} attempts)\n  youtube: chunk {} bytes, privacy {}, thumbnails {}",
        config.bot.name,
        config.bot.language,
        config.bot.work_dir,
        config.storage.database_path,
        config.storage.wal_mode,
        config.storage.persist_conversations,
        config.telegram.allowed_users.len(),
        if config.telegram.allowed_users.is_empty() {
            " (open to everyone)"
        } else {
            ""
        },
        config.openai.model,
        config.imagegen.model,
        config.imagegen.poll_interval_secs,
        config.imagegen.max_poll_attempts,
        config.youtube.chunk_size_bytes,
        config.youtube.privacy_status,
        if config.youtube.attach_thumbnails {
            "attached"
        } else {
            "left to YouTube"
        },
    )
}
