// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing of inbound events.
//!
//! Classification is pure: it only looks at the event and the feedback chat
//! id. Everything that needs the store or the gateway (admin checks, thread
//! lookups, ban state) happens in the engines the route points at.

use parley_core::{ChatId, ChatKind, InboundEvent, InboundMessage, MessageId};

use crate::DropReason;

/// Who a `/ban` or `/unban` applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanTarget {
    /// Explicit numeric identifier given as argument.
    ById(i64),
    /// The originator of the relayed message the command replies to.
    ByReply(MessageId),
}

/// Where an inbound event is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/chat_id` in any chat.
    ChatId,
    /// `/id` or `/get_id` replying to a relayed message in the feedback chat.
    GetId { replied: MessageId },
    /// `/ban` or `/unban` in the feedback chat.
    Moderate { target: BanTarget, ban: bool },
    /// `/broadcast` replying to the message to fan out.
    Broadcast { template: MessageId },
    /// Whole-message command in a private chat.
    UserCommand(String),
    /// Staff reply in the feedback chat.
    FeedbackAnswer { replied: MessageId },
    /// Message from the user side.
    FeedbackRequest,
    /// Edit of a feedback chat message.
    PropagateEdit,
    /// Nothing to do.
    Ignore(DropReason),
}

struct Command<'a> {
    name: &'a str,
    args: &'a str,
}

fn is_command_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits `/name@bot args` into name and trimmed arguments.
fn parse_command(text: &str) -> Option<Command<'_>> {
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    let name = head.split_once('@').map_or(head, |(name, _)| name);
    is_command_name(name).then_some(Command { name, args })
}

/// `true` for a message consisting of exactly `/name`.
fn is_bare_command(text: &str) -> bool {
    text.strip_prefix('/').is_some_and(is_command_name)
}

fn numeric_arg(args: &str) -> Option<i64> {
    if args.is_empty() || !args.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    args.parse().ok()
}

/// Decide how an event is handled.
pub fn classify(event: &InboundEvent, feedback_chat: ChatId) -> Route {
    match event {
        InboundEvent::Edited(msg) if msg.chat == feedback_chat => Route::PropagateEdit,
        InboundEvent::Edited(_) => Route::Ignore(DropReason::Unsupported),
        InboundEvent::Message(msg) => classify_message(msg, feedback_chat),
    }
}

fn classify_message(msg: &InboundMessage, feedback_chat: ChatId) -> Route {
    let in_feedback = msg.chat == feedback_chat;

    if let Some(text) = msg.content.text()
        && text.starts_with('/')
    {
        return classify_command(msg, text, in_feedback);
    }

    if in_feedback {
        return match msg.reply_to {
            Some(replied) => Route::FeedbackAnswer { replied },
            None => Route::Ignore(DropReason::NotAReply),
        };
    }

    if msg.from.is_none() {
        return Route::Ignore(DropReason::NoSender);
    }
    Route::FeedbackRequest
}

fn classify_command(msg: &InboundMessage, text: &str, in_feedback: bool) -> Route {
    let Some(command) = parse_command(text) else {
        return Route::Ignore(DropReason::Command);
    };

    match command.name {
        "ban" | "unban" if in_feedback => {
            let ban = command.name == "ban";
            match (numeric_arg(command.args), msg.reply_to) {
                (Some(id), _) => Route::Moderate {
                    target: BanTarget::ById(id),
                    ban,
                },
                (None, Some(replied)) => Route::Moderate {
                    target: BanTarget::ByReply(replied),
                    ban,
                },
                (None, None) => Route::Ignore(DropReason::NotAReply),
            }
        }
        "chat_id" => Route::ChatId,
        "id" | "get_id" if in_feedback => match msg.reply_to {
            Some(replied) => Route::GetId { replied },
            None => Route::Ignore(DropReason::NotAReply),
        },
        "broadcast" if in_feedback => match msg.reply_to {
            Some(template) => Route::Broadcast { template },
            None => Route::Ignore(DropReason::NotAReply),
        },
        name if msg.chat_kind == ChatKind::Private && is_bare_command(text) => {
            Route::UserCommand(name.to_string())
        }
        _ => Route::Ignore(DropReason::Command),
    }
}
