// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock gateway for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound events,
//! captured outbound calls, sequential message ids, a per-chat administrator
//! table and per-chat scripted delivery failures.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use parley_core::{
    AdapterType, BotCommand, ChannelAdapter, ChatId, DeliveryError, HealthStatus, InboundEvent,
    MessageContent, MessageId, MessageRef, OutboundText, ParleyError, PluginAdapter,
};

/// First id handed out for messages the mock "sends".
pub const FIRST_MESSAGE_ID: i64 = 1000;

/// A successful outbound call, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SendText {
        message: OutboundText,
        produced: MessageRef,
    },
    Copy {
        source: MessageRef,
        to: ChatId,
        reply_to: Option<MessageId>,
        produced: MessageRef,
    },
    Forward {
        source: MessageRef,
        to: ChatId,
        produced: MessageRef,
    },
    Edit {
        target: MessageRef,
        content: MessageContent,
    },
    RegisterCommands(Vec<BotCommand>),
}

/// A mock gateway for testing.
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundEvent>>>,
    notify: Arc<Notify>,
    calls: Mutex<Vec<Call>>,
    attempts: Mutex<HashMap<ChatId, usize>>,
    failures: Mutex<HashMap<ChatId, VecDeque<DeliveryError>>>,
    admins: Mutex<HashMap<ChatId, Vec<i64>>>,
    admin_lookup_fails: AtomicBool,
    next_id: AtomicI64,
}

impl MockChannel {
    /// Create a new mock gateway with empty queues.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            notify: Arc::new(Notify::new()),
            calls: Mutex::new(Vec::new()),
            attempts: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            admins: Mutex::new(HashMap::new()),
            admin_lookup_fails: AtomicBool::new(false),
            next_id: AtomicI64::new(FIRST_MESSAGE_ID),
        }
    }

    /// Inject an inbound event. The next call to `receive()` returns it.
    pub async fn inject(&self, event: InboundEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// Set the administrators of `chat`.
    pub async fn set_admins(&self, chat: ChatId, ids: &[i64]) {
        self.admins.lock().await.insert(chat, ids.to_vec());
    }

    /// Make every administrator lookup fail.
    pub fn fail_admin_lookups(&self) {
        self.admin_lookup_fails.store(true, Ordering::SeqCst);
    }

    /// Queue a failure for the next outbound operation targeting `chat`.
    ///
    /// Failures are consumed in order; once the queue is empty, operations succeed.
    pub async fn fail_next(&self, chat: ChatId, error: DeliveryError) {
        self.failures
            .lock()
            .await
            .entry(chat)
            .or_default()
            .push_back(error);
    }

    /// Queue the same failure `times` times for `chat`.
    pub async fn fail_times(&self, chat: ChatId, error: DeliveryError, times: usize) {
        for _ in 0..times {
            self.fail_next(chat, error.clone()).await;
        }
    }

    /// All successful calls so far.
    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    /// Texts sent through `send_text()`.
    pub async fn sent_texts(&self) -> Vec<OutboundText> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                Call::SendText { message, .. } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Edits applied through `edit()`.
    pub async fn edits(&self) -> Vec<(MessageRef, MessageContent)> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                Call::Edit { target, content } => Some((*target, content.clone())),
                _ => None,
            })
            .collect()
    }

    /// Successful copies as `(source, produced, reply_to)`.
    pub async fn copies(&self) -> Vec<(MessageRef, MessageRef, Option<MessageId>)> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                Call::Copy {
                    source,
                    produced,
                    reply_to,
                    ..
                } => Some((*source, *produced, *reply_to)),
                _ => None,
            })
            .collect()
    }

    /// Successful forwards as `(source, produced)`.
    pub async fn forwards(&self) -> Vec<(MessageRef, MessageRef)> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                Call::Forward {
                    source, produced, ..
                } => Some((*source, *produced)),
                _ => None,
            })
            .collect()
    }

    /// Number of outbound attempts, successful or not, that targeted `chat`.
    pub async fn attempts_to(&self, chat: ChatId) -> usize {
        self.attempts.lock().await.get(&chat).copied().unwrap_or(0)
    }

    /// Clear captured calls and attempt counters.
    pub async fn clear(&self) {
        self.calls.lock().await.clear();
        self.attempts.lock().await.clear();
    }

    async fn attempt(&self, chat: ChatId) -> Result<(), ParleyError> {
        *self.attempts.lock().await.entry(chat).or_insert(0) += 1;
        let scripted = self
            .failures
            .lock()
            .await
            .get_mut(&chat)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    fn allocate(&self, chat: ChatId) -> MessageRef {
        MessageRef::new(chat, MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), ParleyError> {
        Ok(())
    }

    async fn receive(&self) -> Result<InboundEvent, ParleyError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            self.notify.notified().await;
        }
    }

    async fn send_text(&self, message: OutboundText) -> Result<MessageRef, ParleyError> {
        self.attempt(message.chat).await?;
        let produced = self.allocate(message.chat);
        self.calls
            .lock()
            .await
            .push(Call::SendText { message, produced });
        Ok(produced)
    }

    async fn copy(
        &self,
        source: MessageRef,
        to: ChatId,
        reply_to: Option<MessageId>,
    ) -> Result<MessageRef, ParleyError> {
        self.attempt(to).await?;
        let produced = self.allocate(to);
        self.calls.lock().await.push(Call::Copy {
            source,
            to,
            reply_to,
            produced,
        });
        Ok(produced)
    }

    async fn forward(&self, source: MessageRef, to: ChatId) -> Result<MessageRef, ParleyError> {
        self.attempt(to).await?;
        let produced = self.allocate(to);
        self.calls.lock().await.push(Call::Forward {
            source,
            to,
            produced,
        });
        Ok(produced)
    }

    async fn edit(&self, target: MessageRef, content: &MessageContent) -> Result<(), ParleyError> {
        self.attempt(target.chat).await?;
        self.calls.lock().await.push(Call::Edit {
            target,
            content: content.clone(),
        });
        Ok(())
    }

    async fn chat_administrators(&self, chat: ChatId) -> Result<Vec<i64>, ParleyError> {
        if self.admin_lookup_fails.load(Ordering::SeqCst) {
            return Err(DeliveryError::Protocol("admin lookup failed".into()).into());
        }
        Ok(self
            .admins
            .lock()
            .await
            .get(&chat)
            .cloned()
            .unwrap_or_default())
    }

    async fn register_commands(&self, commands: &[BotCommand]) -> Result<(), ParleyError> {
        self.calls
            .lock()
            .await
            .push(Call::RegisterCommands(commands.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn receive_returns_injected_events() {
        let channel = MockChannel::new();
        let user = fixtures::profile(111, "Ann");
        channel
            .inject(fixtures::new_message(fixtures::private_text(&user, 1, "hello")))
            .await;

        match channel.receive().await.unwrap() {
            InboundEvent::Message(msg) => {
                assert_eq!(msg.content, MessageContent::plain("hello"))
            }
            other => panic!("expected new message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn outbound_calls_get_sequential_ids() {
        let channel = MockChannel::new();
        let first = channel
            .send_text(OutboundText::plain(ChatId(-100), "a"))
            .await
            .unwrap();
        let second = channel
            .forward(MessageRef::new(ChatId(111), MessageId(1)), ChatId(-100))
            .await
            .unwrap();

        assert_eq!(first.id, MessageId(FIRST_MESSAGE_ID));
        assert_eq!(second.id, MessageId(FIRST_MESSAGE_ID + 1));
        assert_eq!(channel.calls().await.len(), 2);
        assert_eq!(channel.forwards().await.len(), 1);
    }

    #[tokio::test]
    async fn scripted_failures_are_consumed_in_order() {
        let channel = MockChannel::new();
        let user = ChatId(5);
        let source = MessageRef::new(ChatId(-100), MessageId(9));
        channel.fail_next(user, DeliveryError::Blocked).await;

        let err = channel.copy(source, user, None).await.unwrap_err();
        assert_eq!(err.delivery(), Some(&DeliveryError::Blocked));
        assert!(channel.copy(source, user, None).await.is_ok());
        assert_eq!(channel.attempts_to(user).await, 2);
        assert_eq!(channel.copies().await.len(), 1);
    }

    #[tokio::test]
    async fn admin_table_and_failure_switch() {
        let channel = MockChannel::new();
        channel.set_admins(ChatId(-100), &[9]).await;
        assert_eq!(channel.chat_administrators(ChatId(-100)).await.unwrap(), vec![9]);
        assert!(channel.chat_administrators(ChatId(-200)).await.unwrap().is_empty());

        channel.fail_admin_lookups();
        assert!(channel.chat_administrators(ChatId(-100)).await.is_err());
    }
}
