// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Correlation, moderation and broadcast engines for the Parley feedback relay.
//!
//! [`Relay`] is the service object: it owns handles to the messaging gateway
//! and the store plus the immutable settings, and is cloned into every
//! per-event task. [`Relay::handle`] classifies one event and runs it to
//! completion, returning an [`Outcome`] that tests and metrics inspect.

pub mod broadcast;
pub mod classify;
pub mod commands;
pub mod correlation;
pub mod event_loop;
pub mod moderation;
pub mod recording;
pub mod shutdown;
pub mod templates;

use std::collections::BTreeMap;
use std::sync::Arc;

use parley_config::model::{BroadcastConfig, CommandConfig, ParleyConfig, TextsConfig};
use parley_core::{ChannelAdapter, ChatId, InboundEvent, MessageRef, ParleyError, StorageAdapter};
use strum::IntoStaticStr;
use tracing::debug;

pub use broadcast::{BroadcastSummary, DeliveryOutcome};
pub use classify::{BanTarget, Route};

/// Why an event was dropped without a visible effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum DropReason {
    /// The message has no sender (channel posts, anonymous admins).
    NoSender,
    /// A command or staff message that needs a reply was not one.
    NotAReply,
    /// The replied-to or edited message has no thread link.
    UntrackedThread,
    /// A privileged command from someone who is not a feedback chat admin.
    Unauthorized,
    /// An event kind the relay does not handle.
    Unsupported,
    /// Slash text that is not a recognised command here.
    Command,
}

/// Result of handling one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// User message forwarded into the feedback chat.
    Forwarded(MessageRef),
    /// Staff reply copied to the user.
    Answered(MessageRef),
    /// Linked copy edited.
    Edited(MessageRef),
    /// Sender is banned; nothing was relayed.
    Rejected,
    /// Ban flag changed.
    Moderated { user: i64, banned: bool },
    /// Broadcast completed.
    Broadcast(BroadcastSummary),
    /// End-user command answered.
    Command { name: String, known: bool },
    /// Informational reply sent (`/chat_id`, `/id`).
    Replied,
    /// Dropped silently.
    Dropped(DropReason),
}

/// Immutable settings derived from [`ParleyConfig`].
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub feedback_chat: ChatId,
    pub texts: TextsConfig,
    pub commands: BTreeMap<String, CommandConfig>,
    pub broadcast: BroadcastConfig,
}

impl RelaySettings {
    /// Extract relay settings; fails if no feedback chat is configured.
    pub fn from_config(config: &ParleyConfig) -> Result<Self, ParleyError> {
        let feedback_chat = config
            .relay
            .feedback_chat
            .ok_or_else(|| ParleyError::Config("relay.feedback_chat is required".into()))?;
        Ok(Self {
            feedback_chat: ChatId(feedback_chat),
            texts: config.texts.clone(),
            commands: config.commands.clone(),
            broadcast: config.broadcast.clone(),
        })
    }
}

/// The relay service object.
#[derive(Clone)]
pub struct Relay {
    gateway: Arc<dyn ChannelAdapter>,
    store: Arc<dyn StorageAdapter>,
    settings: Arc<RelaySettings>,
}

impl Relay {
    /// Build a relay over the given gateway and store.
    pub fn new(
        gateway: Arc<dyn ChannelAdapter>,
        store: Arc<dyn StorageAdapter>,
        config: &ParleyConfig,
    ) -> Result<Self, ParleyError> {
        Ok(Self::with_settings(
            gateway,
            store,
            RelaySettings::from_config(config)?,
        ))
    }

    pub fn with_settings(
        gateway: Arc<dyn ChannelAdapter>,
        store: Arc<dyn StorageAdapter>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            gateway,
            store,
            settings: Arc::new(settings),
        }
    }

    /// The distinguished staff chat.
    pub fn feedback_chat(&self) -> ChatId {
        self.settings.feedback_chat
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Classify one event and run it to completion.
    pub async fn handle(&self, event: InboundEvent) -> Result<Outcome, ParleyError> {
        let route = classify::classify(&event, self.settings.feedback_chat);
        let msg = event.message();
        debug!(
            chat_id = msg.chat.0,
            message_id = msg.id.0,
            ?route,
            "routing inbound event"
        );

        let outcome = match route {
            Route::ChatId => self.chat_id(msg).await?,
            Route::GetId { replied } => self.get_id(msg, replied).await?,
            Route::Moderate { target, ban } => self.moderate(msg, target, ban).await?,
            Route::Broadcast { template } => self.broadcast(msg, template).await?,
            Route::UserCommand(name) => self.user_command(msg, &name).await?,
            Route::FeedbackAnswer { replied } => self.feedback_answer(msg, replied).await?,
            Route::FeedbackRequest => self.feedback_request(msg).await?,
            Route::PropagateEdit => self.propagate_edit(msg).await?,
            Route::Ignore(reason) => Outcome::Dropped(reason),
        };

        recording::record_outcome(&outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_require_feedback_chat() {
        let config = ParleyConfig::default();
        assert!(RelaySettings::from_config(&config).is_err());

        let mut config = ParleyConfig::default();
        config.relay.feedback_chat = Some(-100);
        let settings = RelaySettings::from_config(&config).unwrap();
        assert_eq!(settings.feedback_chat, ChatId(-100));
        assert!(settings.commands.contains_key("start"));
    }

    #[test]
    fn drop_reasons_have_snake_case_labels() {
        let label: &'static str = DropReason::UntrackedThread.into();
        assert_eq!(label, "untracked_thread");
        let label: &'static str = DropReason::NoSender.into();
        assert_eq!(label, "no_sender");
    }
}
