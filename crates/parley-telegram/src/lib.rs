// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram gateway adapter for the Parley feedback relay.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide:
//! long polling for new and edited messages, text sends with selectable
//! markup, copy/forward/edit of arbitrary messages, administrator lookup,
//! and command menu registration.

pub mod entities;
pub mod errors;
pub mod handler;

use async_trait::async_trait;
use parley_config::model::TelegramConfig;
use parley_core::{
    AdapterType, BotCommand, ChannelAdapter, ChatId, FormattingMode, HealthStatus, InboundEvent,
    MessageContent, MessageId, MessageRef, OutboundText, ParleyError, PluginAdapter,
};
use teloxide::prelude::*;
use teloxide::types::{
    BotCommand as TgBotCommand, ChatId as TgChatId, LinkPreviewOptions,
    MessageId as TgMessageId, ParseMode, ReplyParameters,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Telegram gateway implementing [`ChannelAdapter`].
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates a new Telegram gateway.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, ParleyError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            ParleyError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;

        if token.is_empty() {
            return Err(ParleyError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

async fn enqueue(tx: &mpsc::Sender<InboundEvent>, msg: &Message, edited: bool) {
    match handler::to_event(msg, edited) {
        Some(event) => {
            if tx.send(event).await.is_err() {
                warn!("inbound channel closed, dropping message");
            }
        }
        None => debug!(
            chat_id = msg.chat.id.0,
            msg_id = msg.id.0,
            "ignoring unsupported message type"
        ),
    }
}

fn tg_chat(chat: ChatId) -> TgChatId {
    TgChatId(chat.0)
}

fn tg_message_id(id: MessageId) -> Result<TgMessageId, ParleyError> {
    i32::try_from(id.0)
        .map(TgMessageId)
        .map_err(|e| ParleyError::Channel {
            message: format!("message id {id} out of range: {e}"),
            source: None,
        })
}

fn reply_parameters(reply_to: MessageId) -> Result<ReplyParameters, ParleyError> {
    Ok(ReplyParameters::new(tg_message_id(reply_to)?).allow_sending_without_reply())
}

fn parse_mode(mode: FormattingMode) -> Option<ParseMode> {
    match mode {
        FormattingMode::Plain => None,
        #[allow(deprecated)]
        FormattingMode::Markdown => Some(ParseMode::Markdown),
        FormattingMode::MarkdownV2 => Some(ParseMode::MarkdownV2),
        FormattingMode::Html => Some(ParseMode::Html),
    }
}

fn disabled_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
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

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        debug!("Telegram channel shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), ParleyError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let new_tx = self.inbound_tx.clone();
        let edit_tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = dptree::entry()
                .branch(Update::filter_message().endpoint(move |msg: Message| {
                    let tx = new_tx.clone();
                    async move {
                        enqueue(&tx, &msg, false).await;
                        respond(())
                    }
                }))
                .branch(
                    Update::filter_edited_message().endpoint(move |msg: Message| {
                        let tx = edit_tx.clone();
                        async move {
                            enqueue(&tx, &msg, true).await;
                            respond(())
                        }
                    }),
                );

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn receive(&self) -> Result<InboundEvent, ParleyError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| ParleyError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }

    async fn send_text(&self, msg: OutboundText) -> Result<MessageRef, ParleyError> {
        let mut request = self.bot.send_message(tg_chat(msg.chat), msg.text);
        if let Some(reply_to) = msg.reply_to {
            request = request.reply_parameters(reply_parameters(reply_to)?);
        }
        if let Some(mode) = parse_mode(msg.formatting) {
            request = request.parse_mode(mode);
        }
        if msg.disable_preview {
            request = request.link_preview_options(disabled_preview());
        }

        let sent = request.await.map_err(errors::classify)?;
        Ok(MessageRef::new(msg.chat, MessageId(i64::from(sent.id.0))))
    }

    async fn copy(
        &self,
        source: MessageRef,
        to: ChatId,
        reply_to: Option<MessageId>,
    ) -> Result<MessageRef, ParleyError> {
        let mut request =
            self.bot
                .copy_message(tg_chat(to), tg_chat(source.chat), tg_message_id(source.id)?);
        if let Some(reply_to) = reply_to {
            request = request.reply_parameters(reply_parameters(reply_to)?);
        }

        let copied = request.await.map_err(errors::classify)?;
        Ok(MessageRef::new(to, MessageId(i64::from(copied.0))))
    }

    async fn forward(&self, source: MessageRef, to: ChatId) -> Result<MessageRef, ParleyError> {
        let forwarded = self
            .bot
            .forward_message(tg_chat(to), tg_chat(source.chat), tg_message_id(source.id)?)
            .await
            .map_err(errors::classify)?;
        Ok(MessageRef::new(to, MessageId(i64::from(forwarded.id.0))))
    }

    async fn edit(&self, target: MessageRef, content: &MessageContent) -> Result<(), ParleyError> {
        let chat = tg_chat(target.chat);
        let id = tg_message_id(target.id)?;

        let result = match content {
            MessageContent::Text {
                text,
                entities: spans,
            } => {
                let mut request = self.bot.edit_message_text(chat, id, text.clone());
                if !spans.is_empty() {
                    request = request.entities(entities::to_telegram(spans));
                }
                request.await.map(|_| ())
            }
            MessageContent::Media {
                caption,
                entities: spans,
            } => {
                let mut request = self.bot.edit_message_caption(chat, id);
                if let Some(caption) = caption {
                    request = request.caption(caption.clone());
                    if !spans.is_empty() {
                        request = request.caption_entities(entities::to_telegram(spans));
                    }
                }
                request.await.map(|_| ())
            }
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if errors::is_not_modified(&e) => {
                debug!(chat_id = target.chat.0, msg_id = target.id.0, "edit left message unchanged");
                Ok(())
            }
            Err(e) => Err(errors::classify(e)),
        }
    }

    async fn chat_administrators(&self, chat: ChatId) -> Result<Vec<i64>, ParleyError> {
        let members = self
            .bot
            .get_chat_administrators(tg_chat(chat))
            .await
            .map_err(errors::classify)?;
        Ok(members.iter().map(|m| m.user.id.0 as i64).collect())
    }

    async fn register_commands(&self, commands: &[BotCommand]) -> Result<(), ParleyError> {
        let menu: Vec<TgBotCommand> = commands
            .iter()
            .map(|c| TgBotCommand::new(c.name.clone(), c.description.clone()))
            .collect();
        self.bot
            .set_my_commands(menu)
            .await
            .map_err(errors::classify)?;
        info!(count = commands.len(), "bot commands registered");
        Ok(())
    }
}
