// SPDX-FileCopyrightText: 2026 Reelsmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for Reelsmith.
//!
//! Implements [`ChannelAdapter`] over the Telegram Bot API via teloxide:
//! long polling for messages and inline keyboard callbacks, DM and
//! allow-list filtering, and effect rendering with inline keyboards.

pub mod handler;
pub mod media;
pub mod render;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use reelsmith_config::model::TelegramConfig;
use reelsmith_core::{
    AdapterType, ChannelAdapter, Event, HealthStatus, InboundEvent, MessageId, OutboundMessage,
    PluginAdapter, ReelsmithError,
};

/// Telegram channel adapter implementing [`ChannelAdapter`].
pub struct TelegramChannel {
    bot: Bot,
    config: TelegramConfig,
    uploads_dir: PathBuf,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: std::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl TelegramChannel {
    /// Requires `config.bot_token`. Received files are stored under
    /// `work_dir/uploads`.
    pub fn new(config: TelegramConfig, work_dir: impl Into<PathBuf>) -> Result<Self, ReelsmithError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            ReelsmithError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;
        if token.is_empty() {
            return Err(ReelsmithError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            config,
            uploads_dir: work_dir.into().join("uploads"),
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: std::sync::Mutex::new(None),
        })
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ReelsmithError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), ReelsmithError> {
        debug!("Telegram channel shutting down");
        if let Ok(mut slot) = self.polling_handle.lock()
            && let Some(handle) = slot.take()
        {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), ReelsmithError> {
        let slot = self.polling_handle.get_mut().map_err(|_| {
            ReelsmithError::Internal("telegram polling handle lock poisoned".into())
        })?;
        if slot.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let allowed_users: Arc<Vec<String>> = Arc::new(self.config.allowed_users.clone());
        let uploads_dir = Arc::new(self.uploads_dir.clone());
        let message_tx = self.inbound_tx.clone();
        let callback_tx = self.inbound_tx.clone();
        let message_allowed = Arc::clone(&allowed_users);
        let callback_allowed = allowed_users;

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let on_message = move |bot: Bot, msg: Message| {
                let tx = message_tx.clone();
                let allowed = Arc::clone(&message_allowed);
                let uploads_dir = Arc::clone(&uploads_dir);
                async move {
                    if !handler::is_dm(&msg) {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                        return respond(());
                    }
                    let Some(user) = msg.from.as_ref() else {
                        return respond(());
                    };
                    if !handler::is_authorized(Some(user), &allowed) {
                        debug!(chat_id = msg.chat.id.0, "ignoring unauthorized user");
                        return respond(());
                    }

                    match handler::message_event(&bot, &msg, &uploads_dir).await {
                        Ok(Some(event)) => {
                            if let Err(mpsc::error::SendError(dropped)) =
                                tx.send(handler::inbound(user, msg.chat.id, event)).await
                            {
                                warn!("inbound channel closed, dropping message");
                                if let Event::File(artifact) = dropped.event {
                                    let _ = tokio::fs::remove_file(&artifact.path).await;
                                }
                            }
                        }
                        Ok(None) => {}
                        Err(e) => error!(error = %e, "failed to extract message event"),
                    }
                    respond(())
                }
            };

            let on_callback = move |bot: Bot, q: CallbackQuery| {
                let tx = callback_tx.clone();
                let allowed = Arc::clone(&callback_allowed);
                async move {
                    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                        debug!(error = %e, "failed to answer callback query");
                    }
                    if !handler::is_authorized(Some(&q.from), &allowed) {
                        debug!(user_id = q.from.id.0, "ignoring unauthorized callback");
                        return respond(());
                    }
                    let chat_id = q
                        .message
                        .as_ref()
                        .map(|m| m.chat().id)
                        .unwrap_or(ChatId(q.from.id.0 as i64));
                    match q.data.as_deref().and_then(handler::callback_event) {
                        Some(event) => {
                            if tx.send(handler::inbound(&q.from, chat_id, event)).await.is_err() {
                                warn!("inbound channel closed, dropping callback");
                            }
                        }
                        None => debug!(data = ?q.data, "ignoring unknown callback data"),
                    }
                    respond(())
                }
            };

            let tree = dptree::entry()
                .branch(Update::filter_message().endpoint(on_message))
                .branch(Update::filter_callback_query().endpoint(on_callback));

            Dispatcher::builder(bot, tree)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        *slot = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ReelsmithError> {
        let Some(rendered) = render::render(&msg.effect) else {
            return Ok(MessageId(String::new()));
        };
        let chat_id = parse_chat_id(&msg.chat_id)?;

        let mut request = self.bot.send_message(chat_id, rendered.text);
        if let Some(keyboard) = rendered.keyboard {
            request = request.reply_markup(keyboard);
        }
        let sent = request.await.map_err(|e| ReelsmithError::Channel {
            message: format!("failed to send message: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn receive(&self) -> Result<InboundEvent, ReelsmithError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| ReelsmithError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }
}

fn parse_chat_id(chat_id: &str) -> Result<ChatId, ReelsmithError> {
    chat_id
        .parse::<i64>()
        .map(ChatId)
        .map_err(|e| ReelsmithError::Channel {
            message: format!("invalid chat_id {chat_id:?}: {e}"),
            source: None,
        })
}
