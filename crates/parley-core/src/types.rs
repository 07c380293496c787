// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the relay engines.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Platform chat identifier. For private chats it equals the user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message identifier, unique within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message addressed by its chat and its id within that chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat: ChatId,
    pub id: MessageId,
}

impl MessageRef {
    pub fn new(chat: ChatId, id: MessageId) -> Self {
        Self { chat, id }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}

// --- Identity ---

/// Profile fields of a message sender as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl UserProfile {
    /// Human readable sender line: `First Last [id] @username`.
    ///
    /// Absent name parts are omitted.
    pub fn title(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(4);
        if let Some(first) = self.first_name.as_deref().filter(|s| !s.is_empty()) {
            parts.push(first.to_string());
        }
        if let Some(last) = self.last_name.as_deref().filter(|s| !s.is_empty()) {
            parts.push(last.to_string());
        }
        parts.push(format!("[{}]", self.id));
        if let Some(username) = self.username.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("@{username}"));
        }
        parts.join(" ")
    }
}

/// A registered end-user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub reputation: i64,
    pub banned: bool,
    pub registered_at: String,
}

// --- Thread links ---

/// Direction of a thread link.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// A user message forwarded into the feedback chat.
    Request,
    /// A staff reply copied back to the user.
    Response,
}

/// Durable correlation between a message and its copy on the other side of the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadLink {
    pub id: i64,
    pub source: MessageRef,
    pub destination: MessageRef,
    pub kind: LinkKind,
}

// --- Gateway message types ---

/// Kind of chat an inbound message was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
}

/// Style applied by a [`TextEntity`].
///
/// Only explicit formatting is carried. Mentions, hashtags, URLs and other
/// auto-detected spans are recomputed by the platform on delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Code,
    Pre { language: Option<String> },
    TextLink { url: String },
    Blockquote,
}

/// A formatted span of a text body or caption.
///
/// `offset` and `length` count UTF-16 code units, as the platform does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntity {
    pub kind: EntityKind,
    pub offset: usize,
    pub length: usize,
}

impl TextEntity {
    pub fn new(kind: EntityKind, offset: usize, length: usize) -> Self {
        Self {
            kind,
            offset,
            length,
        }
    }
}

/// Relayable message payload.
///
/// The relay never inspects media; it only needs to know whether an edit
/// targets the text body or the caption, and which formatting to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text {
        text: String,
        entities: Vec<TextEntity>,
    },
    Media {
        caption: Option<String>,
        entities: Vec<TextEntity>,
    },
}

impl MessageContent {
    /// Unformatted text body.
    pub fn plain(text: impl Into<String>) -> Self {
        MessageContent::Text {
            text: text.into(),
            entities: Vec::new(),
        }
    }

    /// The text body, if this is a text message.
    pub fn text(&self) -> Option<&str> {
        match self {
            MessageContent::Text { text, .. } => Some(text),
            MessageContent::Media { .. } => None,
        }
    }

    /// Formatting of the text body or caption.
    pub fn entities(&self) -> &[TextEntity] {
        match self {
            MessageContent::Text { entities, .. } | MessageContent::Media { entities, .. } => {
                entities
            }
        }
    }
}

/// A message received from the gateway.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub chat: ChatId,
    pub chat_kind: ChatKind,
    pub id: MessageId,
    pub from: Option<UserProfile>,
    pub content: MessageContent,
    pub reply_to: Option<MessageId>,
}

impl InboundMessage {
    /// Address of this message.
    pub fn reference(&self) -> MessageRef {
        MessageRef::new(self.chat, self.id)
    }
}

/// An event delivered by the gateway.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// A new message.
    Message(InboundMessage),
    /// An edit of a previously posted message.
    Edited(InboundMessage),
}

impl InboundEvent {
    /// The message carried by this event.
    pub fn message(&self) -> &InboundMessage {
        match self {
            InboundEvent::Message(msg) | InboundEvent::Edited(msg) => msg,
        }
    }
}

/// Markup applied to outbound text.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FormattingMode {
    Plain,
    #[default]
    Markdown,
    MarkdownV2,
    Html,
}

/// A text message to be sent through the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundText {
    pub chat: ChatId,
    pub text: String,
    pub reply_to: Option<MessageId>,
    pub formatting: FormattingMode,
    pub disable_preview: bool,
}

impl OutboundText {
    /// Unformatted text, no reply threading, previews enabled.
    pub fn plain(chat: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat,
            text: text.into(),
            reply_to: None,
            formatting: FormattingMode::Plain,
            disable_preview: false,
        }
    }

    /// Thread the message as a reply to `reply_to`, if any.
    pub fn reply_to(mut self, reply_to: Option<MessageId>) -> Self {
        self.reply_to = reply_to;
        self
    }
}

/// A command advertised in the platform's command menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotCommand {
    pub name: String,
    pub description: String,
}
