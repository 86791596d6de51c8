// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `reelsmith serve` command implementation.
//!
//! Opens SQLite storage, fails jobs a previous process left unfinished,
//! wires the collaborators into the orchestrator and runs the dispatch loop
//! over the Telegram channel until SIGINT/SIGTERM.

use std::sync::Arc;

use tracing::{info, warn};

use reelsmith_config::model::ReelsmithConfig;
use reelsmith_core::{
    ChannelAdapter, ConversationStore, JobStore, PluginAdapter, ReelsmithError, StorageAdapter,
};
use reelsmith_dialogue::{
    Collaborators, Dispatcher, MemoryConversationStore, Orchestrator, OrchestratorSettings,
    shutdown,
};
use reelsmith_imagegen::KieImageGenerator;
use reelsmith_openai::OpenAiTextGenerator;
use reelsmith_storage::SqliteStorage;
use reelsmith_telegram::TelegramChannel;
use reelsmith_youtube::{PlateRenderer, YoutubeHost};

/// Failure reason recorded on jobs found unfinished at startup.
pub const STALE_JOB_REASON: &str = "interrupted by restart";

pub async fn run_serve(config: ReelsmithConfig) -> Result<(), ReelsmithError> {
    init_tracing(&config.bot.log_level);

    info!(name = config.bot.name.as_str(), "starting reelsmith serve");

    let storage = open_storage(&config).await?;
    let orchestrator = Arc::new(build_orchestrator(&config, Arc::clone(&storage))?);

    let mut channel = TelegramChannel::new(config.telegram.clone(), &config.bot.work_dir)?;
    channel.connect().await?;
    let channel = Arc::new(channel);

    let cancel = shutdown::install_signal_handler();
    let dispatcher = Dispatcher::new(channel.clone() as Arc<dyn ChannelAdapter>, orchestrator);
    dispatcher.run(cancel).await?;

    if let Err(e) = channel.shutdown().await {
        warn!(error = %e, "channel shutdown failed");
    }
    storage.close().await?;

    info!("reelsmith serve shutdown complete");
    Ok(())
}

/// Opens and migrates the database, then fails any job left in `draft` or
/// `processing` by a previous process.
pub(crate) async fn open_storage(
    config: &ReelsmithConfig,
) -> Result<Arc<SqliteStorage>, ReelsmithError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;

    let stale = storage.fail_stale_jobs(STALE_JOB_REASON).await?;
    if stale > 0 {
        info!(count = stale, "marked interrupted jobs as failed");
    }
    Ok(Arc::new(storage))
}

pub(crate) fn build_orchestrator(
    config: &ReelsmithConfig,
    storage: Arc<SqliteStorage>,
) -> Result<Orchestrator, ReelsmithError> {
    let conversations: Arc<dyn ConversationStore> = if config.storage.persist_conversations {
        storage.clone()
    } else {
        info!("conversation state kept in memory only");
        Arc::new(MemoryConversationStore::new())
    };

    let collaborators = Collaborators {
        jobs: storage as Arc<dyn JobStore>,
        conversations,
        text: Arc::new(OpenAiTextGenerator::new(&config.openai)?),
        images: Arc::new(KieImageGenerator::new(&config.imagegen)?),
        videos: Arc::new(YoutubeHost::new(&config.youtube)?),
        thumbnails: Arc::new(PlateRenderer),
    };
    Ok(Orchestrator::new(
        collaborators,
        OrchestratorSettings::from_config(config),
    ))
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reelsmith={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
