// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping between Telegram message entities and [`TextEntity`].
//!
//! Only explicit formatting is carried. Auto-detected spans (mentions,
//! hashtags, URLs, commands) are recomputed by Telegram on every send.

use parley_core::{EntityKind, TextEntity};
use teloxide::types::{MessageEntity, MessageEntityKind};

/// Converts the entities Telegram attached to a text or caption.
pub fn from_telegram(entities: Option<&[MessageEntity]>) -> Vec<TextEntity> {
    entities
        .unwrap_or_default()
        .iter()
        .filter_map(|e| {
            let kind = match &e.kind {
                MessageEntityKind::Bold => EntityKind::Bold,
                MessageEntityKind::Italic => EntityKind::Italic,
                MessageEntityKind::Underline => EntityKind::Underline,
                MessageEntityKind::Strikethrough => EntityKind::Strikethrough,
                MessageEntityKind::Spoiler => EntityKind::Spoiler,
                MessageEntityKind::Code => EntityKind::Code,
                MessageEntityKind::Pre { language } => EntityKind::Pre {
                    language: language.clone(),
                },
                MessageEntityKind::TextLink { url } => EntityKind::TextLink {
                    url: url.to_string(),
                },
                MessageEntityKind::Blockquote => EntityKind::Blockquote,
                _ => return None,
            };
            Some(TextEntity::new(kind, e.offset, e.length))
        })
        .collect()
}

/// Converts relay entities back into Telegram's representation.
///
/// Links whose URL no longer parses are dropped rather than failing the edit.
pub fn to_telegram(entities: &[TextEntity]) -> Vec<MessageEntity> {
    entities
        .iter()
        .filter_map(|e| {
            let kind = match &e.kind {
                EntityKind::Bold => MessageEntityKind::Bold,
                EntityKind::Italic => MessageEntityKind::Italic,
                EntityKind::Underline => MessageEntityKind::Underline,
                EntityKind::Strikethrough => MessageEntityKind::Strikethrough,
                EntityKind::Spoiler => MessageEntityKind::Spoiler,
                EntityKind::Code => MessageEntityKind::Code,
                EntityKind::Pre { language } => MessageEntityKind::Pre {
                    language: language.clone(),
                },
                EntityKind::TextLink { url } => MessageEntityKind::TextLink {
                    url: url.parse().ok()?,
                },
                EntityKind::Blockquote => MessageEntityKind::Blockquote,
            };
            Some(MessageEntity::new(kind, e.offset, e.length))
        })
        .collect()
}
