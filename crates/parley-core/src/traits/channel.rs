// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging gateway trait (Telegram, test doubles).

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    BotCommand, ChatId, InboundEvent, MessageContent, MessageId, MessageRef, OutboundText,
};

/// Adapter for the chat platform the relay runs on.
///
/// Delivery failures are reported as [`ParleyError::Delivery`] carrying a
/// classified [`DeliveryError`](crate::DeliveryError).
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Starts receiving updates from the platform.
    async fn connect(&mut self) -> Result<(), ParleyError>;

    /// Receives the next inbound event.
    async fn receive(&self) -> Result<InboundEvent, ParleyError>;

    /// Sends a text message.
    async fn send_text(&self, msg: OutboundText) -> Result<MessageRef, ParleyError>;

    /// Copies `source` into `to` without attribution, optionally as a reply.
    async fn copy(
        &self,
        source: MessageRef,
        to: ChatId,
        reply_to: Option<MessageId>,
    ) -> Result<MessageRef, ParleyError>;

    /// Forwards `source` into `to`, keeping the original sender attribution.
    async fn forward(&self, source: MessageRef, to: ChatId) -> Result<MessageRef, ParleyError>;

    /// Replaces the text (or caption, for media) of a message the bot sent.
    async fn edit(&self, target: MessageRef, content: &MessageContent) -> Result<(), ParleyError>;

    /// Lists the user ids of the administrators of `chat`.
    async fn chat_administrators(&self, chat: ChatId) -> Result<Vec<i64>, ParleyError>;

    /// Publishes the command menu.
    async fn register_commands(&self, commands: &[BotCommand]) -> Result<(), ParleyError>;
}
