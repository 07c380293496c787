// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message builders.

use parley_core::{
    ChatId, ChatKind, InboundEvent, InboundMessage, MessageContent, MessageId, TextEntity,
    UserProfile,
};

/// A sender with only a first name.
pub fn profile(id: i64, first_name: &str) -> UserProfile {
    UserProfile {
        id,
        first_name: Some(first_name.to_string()),
        last_name: None,
        username: None,
    }
}

fn message(
    chat: ChatId,
    chat_kind: ChatKind,
    id: i64,
    from: Option<UserProfile>,
    content: MessageContent,
    reply_to: Option<i64>,
) -> InboundMessage {
    InboundMessage {
        chat,
        chat_kind,
        id: MessageId(id),
        from,
        content,
        reply_to: reply_to.map(MessageId),
    }
}

/// Text sent by `user` in their private chat with the bot.
pub fn private_text(user: &UserProfile, id: i64, text: &str) -> InboundMessage {
    message(
        ChatId(user.id),
        ChatKind::Private,
        id,
        Some(user.clone()),
        MessageContent::plain(text),
        None,
    )
}

/// Media with an optional caption sent by `user` in their private chat.
pub fn private_media(user: &UserProfile, id: i64, caption: Option<&str>) -> InboundMessage {
    message(
        ChatId(user.id),
        ChatKind::Private,
        id,
        Some(user.clone()),
        MessageContent::Media {
            caption: caption.map(str::to_string),
            entities: Vec::new(),
        },
        None,
    )
}

/// Private text threaded as a reply to `reply_to`.
pub fn private_reply(user: &UserProfile, id: i64, text: &str, reply_to: i64) -> InboundMessage {
    let mut msg = private_text(user, id, text);
    msg.reply_to = Some(MessageId(reply_to));
    msg
}

/// Text posted in a group chat, optionally as a reply.
pub fn group_text(
    chat: i64,
    from: &UserProfile,
    id: i64,
    text: &str,
    reply_to: Option<i64>,
) -> InboundMessage {
    message(
        ChatId(chat),
        ChatKind::Group,
        id,
        Some(from.clone()),
        MessageContent::plain(text),
        reply_to,
    )
}

/// Media posted in a group chat as a reply.
pub fn group_media_reply(
    chat: i64,
    from: &UserProfile,
    id: i64,
    caption: Option<&str>,
    reply_to: i64,
) -> InboundMessage {
    message(
        ChatId(chat),
        ChatKind::Group,
        id,
        Some(from.clone()),
        MessageContent::Media {
            caption: caption.map(str::to_string),
            entities: Vec::new(),
        },
        Some(reply_to),
    )
}

/// A message without a sender, as channel posts arrive.
pub fn anonymous(chat: i64, id: i64, text: &str) -> InboundMessage {
    message(
        ChatId(chat),
        ChatKind::Group,
        id,
        None,
        MessageContent::plain(text),
        None,
    )
}

/// Replace the formatting of a message's text body or caption.
pub fn with_entities(mut msg: InboundMessage, entities: Vec<TextEntity>) -> InboundMessage {
    match &mut msg.content {
        MessageContent::Text { entities: slot, .. } | MessageContent::Media { entities: slot, .. } => {
            *slot = entities
        }
    }
    msg
}

/// Wrap as a new-message event.
pub fn new_message(msg: InboundMessage) -> InboundEvent {
    InboundEvent::Message(msg)
}

/// Wrap as an edit event.
pub fn edited(msg: InboundMessage) -> InboundEvent {
    InboundEvent::Edited(msg)
}
