// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley feedback relay.
//!
//! Defines the error taxonomy, the shared message/identity/link types, and
//! the adapter traits for the two external collaborators: the messaging
//! gateway ([`ChannelAdapter`]) and the relational store ([`StorageAdapter`]).

pub mod error;
pub mod traits;
pub mod types;

pub use error::{DeliveryError, ParleyError};
pub use types::{
    AdapterType, BotCommand, ChatId, ChatKind, EntityKind, FormattingMode, HealthStatus, Identity,
    InboundEvent, InboundMessage, LinkKind, MessageContent, MessageId, MessageRef, OutboundText,
    TextEntity, ThreadLink, UserProfile,
};

pub use traits::{ChannelAdapter, PluginAdapter, StorageAdapter};
