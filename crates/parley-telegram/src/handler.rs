// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of Telegram updates into gateway-neutral inbound events.
//!
//! Only payloads the relay can carry (text and the common media kinds) are
//! converted; service messages, polls, locations and the like yield `None`.

use parley_core::{
    ChatId, ChatKind, InboundEvent, InboundMessage, MessageContent, MessageId, UserProfile,
};
use teloxide::types::{Message, User};

use crate::entities;

/// Extracts the relayable payload of a message, keeping its formatting.
pub fn extract_content(msg: &Message) -> Option<MessageContent> {
    if let Some(text) = msg.text() {
        return Some(MessageContent::Text {
            text: text.to_string(),
            entities: entities::from_telegram(msg.entities()),
        });
    }

    let is_media = msg.photo().is_some()
        || msg.document().is_some()
        || msg.sticker().is_some()
        || msg.voice().is_some()
        || msg.video().is_some()
        || msg.video_note().is_some()
        || msg.audio().is_some()
        || msg.animation().is_some();

    is_media.then(|| MessageContent::Media {
        caption: msg.caption().map(str::to_string),
        entities: entities::from_telegram(msg.caption_entities()),
    })
}

/// Profile of a Telegram user.
pub fn to_profile(user: &User) -> UserProfile {
    UserProfile {
        id: user.id.0 as i64,
        first_name: Some(user.first_name.clone()).filter(|s| !s.is_empty()),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
    }
}

/// Converts a Telegram message and its extracted content into an [`InboundMessage`].
pub fn to_inbound_message(msg: &Message, content: MessageContent) -> InboundMessage {
    let chat_kind = if msg.chat.is_private() {
        ChatKind::Private
    } else {
        ChatKind::Group
    };

    InboundMessage {
        chat: ChatId(msg.chat.id.0),
        chat_kind,
        id: MessageId(i64::from(msg.id.0)),
        from: msg.from.as_ref().map(to_profile),
        content,
        reply_to: msg
            .reply_to_message()
            .map(|parent| MessageId(i64::from(parent.id.0))),
    }
}

/// Wraps a new or edited message as an [`InboundEvent`], if it is relayable.
pub fn to_event(msg: &Message, edited: bool) -> Option<InboundEvent> {
    let inbound = to_inbound_message(msg, extract_content(msg)?);
    Some(if edited {
        InboundEvent::Edited(inbound)
    } else {
        InboundEvent::Message(inbound)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{EntityKind, TextEntity};

    fn sender(user_id: u64) -> serde_json::Value {
        serde_json::json!({
            "id": user_id,
            "is_bot": false,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "username": "ada",
        })
    }

    /// Build a mock private chat message from JSON, matching Telegram Bot API structure.
    fn make_private_message(user_id: u64, text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 5,
            "date": 1700000000i64,
            "chat": {
                "id": user_id as i64,
                "type": "private",
                "first_name": "Ada",
            },
            "from": sender(user_id),
            "text": text,
        });

        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    /// Build a mock reply posted in a supergroup.
    fn make_group_reply(user_id: u64, text: &str, parent_id: i32) -> Message {
        let json = serde_json::json!({
            "message_id": 50,
            "date": 1700000100i64,
            "chat": {
                "id": -100123i64,
                "type": "supergroup",
                "title": "Feedback",
            },
            "from": sender(user_id),
            "text": text,
            "reply_to_message": {
                "message_id": parent_id,
                "date": 1700000000i64,
                "chat": {
                    "id": -100123i64,
                    "type": "supergroup",
                    "title": "Feedback",
                },
                "text": "original",
            },
        });

        serde_json::from_value(json).expect("failed to deserialize mock group message")
    }

    fn make_photo_message(caption: Option<&str>) -> Message {
        let mut json = serde_json::json!({
            "message_id": 6,
            "date": 1700000000i64,
            "chat": {
                "id": 111i64,
                "type": "private",
                "first_name": "Ada",
            },
            "from": sender(111),
            "photo": [{
                "file_id": "photo-id",
                "file_unique_id": "photo-unique",
                "width": 90,
                "height": 90,
                "file_size": 1024,
            }],
        });
        if let Some(caption) = caption {
            json["caption"] = serde_json::Value::String(caption.to_string());
        }

        serde_json::from_value(json).expect("failed to deserialize mock photo message")
    }

    /// Build a private message whose text carries explicit formatting.
    fn make_formatted_message() -> Message {
        let json = serde_json::json!({
            "message_id": 8,
            "date": 1700000000i64,
            "chat": {
                "id": 111i64,
                "type": "private",
                "first_name": "Ada",
            },
            "from": sender(111),
            "text": "Hello #team see docs",
            "entities": [
                {"type": "bold", "offset": 0, "length": 5},
                {"type": "hashtag", "offset": 6, "length": 5},
                {"type": "text_link", "offset": 16, "length": 4, "url": "https://example.com/docs"},
            ],
        });

        serde_json::from_value(json).expect("failed to deserialize mock formatted message")
    }

    fn make_animation_message() -> Message {
        let json = serde_json::json!({
            "message_id": 9,
            "date": 1700000000i64,
            "chat": {
                "id": 111i64,
                "type": "private",
                "first_name": "Ada",
            },
            "from": sender(111),
            "animation": {
                "file_id": "anim-id",
                "file_unique_id": "anim-unique",
                "width": 320,
                "height": 240,
                "duration": 3,
            },
            "caption": "so fast",
            "caption_entities": [
                {"type": "italic", "offset": 3, "length": 4},
            ],
        });

        serde_json::from_value(json).expect("failed to deserialize mock animation message")
    }

    fn make_location_message() -> Message {
        let json = serde_json::json!({
            "message_id": 7,
            "date": 1700000000i64,
            "chat": {
                "id": 111i64,
                "type": "private",
                "first_name": "Ada",
            },
            "from": sender(111),
            "location": {
                "latitude": 51.5,
                "longitude": -0.12,
            },
        });

        serde_json::from_value(json).expect("failed to deserialize mock location message")
    }

    #[test]
    fn private_text_message_maps_fields() {
        let msg = make_private_message(111, "hello");
        let inbound = to_inbound_message(&msg, extract_content(&msg).unwrap());

        assert_eq!(inbound.chat, ChatId(111));
        assert_eq!(inbound.chat_kind, ChatKind::Private);
        assert_eq!(inbound.id, MessageId(5));
        assert_eq!(inbound.content, MessageContent::plain("hello"));
        assert!(inbound.reply_to.is_none());

        let from = inbound.from.unwrap();
        assert_eq!(from.id, 111);
        assert_eq!(from.title(), "Ada Lovelace [111] @ada");
    }

    #[test]
    fn group_reply_carries_parent_id() {
        let msg = make_group_reply(9, "Thanks", 42);
        let inbound = to_inbound_message(&msg, extract_content(&msg).unwrap());

        assert_eq!(inbound.chat, ChatId(-100123));
        assert_eq!(inbound.chat_kind, ChatKind::Group);
        assert_eq!(inbound.reply_to, Some(MessageId(42)));
    }

    #[test]
    fn photo_is_media_with_caption() {
        let msg = make_photo_message(Some("look"));
        assert_eq!(
            extract_content(&msg),
            Some(MessageContent::Media {
                caption: Some("look".into()),
                entities: Vec::new(),
            })
        );

        let bare = make_photo_message(None);
        assert_eq!(
            extract_content(&bare),
            Some(MessageContent::Media {
                caption: None,
                entities: Vec::new(),
            })
        );
    }

    #[test]
    fn text_formatting_survives_conversion() {
        let msg = make_formatted_message();
        let inbound = to_inbound_message(&msg, extract_content(&msg).unwrap());

        assert_eq!(
            inbound.content,
            MessageContent::Text {
                text: "Hello #team see docs".into(),
                entities: vec![
                    TextEntity::new(EntityKind::Bold, 0, 5),
                    TextEntity::new(
                        EntityKind::TextLink {
                            url: "https://example.com/docs".into(),
                        },
                        16,
                        4,
                    ),
                ],
            }
        );
    }

    #[test]
    fn animation_is_media_with_caption_formatting() {
        let msg = make_animation_message();
        assert_eq!(
            extract_content(&msg),
            Some(MessageContent::Media {
                caption: Some("so fast".into()),
                entities: vec![TextEntity::new(EntityKind::Italic, 3, 4)],
            })
        );
    }

    #[test]
    fn unsupported_payload_yields_no_event() {
        let msg = make_location_message();
        assert!(extract_content(&msg).is_none());
        assert!(to_event(&msg, false).is_none());
    }

    #[test]
    fn edited_flag_selects_event_kind() {
        let msg = make_private_message(111, "fixed typo");
        assert!(matches!(to_event(&msg, true), Some(InboundEvent::Edited(_))));
        assert!(matches!(to_event(&msg, false), Some(InboundEvent::Message(_))));
    }
}
