// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait: the identity store and the thread link table.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Identity, LinkKind, MessageRef, UserProfile};

/// Adapter for the relational store backing the relay.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection).
    async fn initialize(&self) -> Result<(), ParleyError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), ParleyError>;

    // --- Identity store ---

    /// Registers the sender unless already known. Returns `true` if a row was inserted.
    async fn ensure_registered(&self, profile: &UserProfile) -> Result<bool, ParleyError>;

    /// Fetches a registered identity.
    async fn get_identity(&self, id: i64) -> Result<Option<Identity>, ParleyError>;

    /// Ban flag of a registered identity; [`ParleyError::NotFound`] if unknown.
    async fn is_banned(&self, id: i64) -> Result<bool, ParleyError>;

    /// Sets the ban flag. Returns `false` when no identity matched.
    async fn set_ban(&self, id: i64, banned: bool) -> Result<bool, ParleyError>;

    /// All registered identifiers, in registration order.
    async fn list_identity_ids(&self) -> Result<Vec<i64>, ParleyError>;

    // --- Thread link table ---

    /// Records a link after a successful delivery.
    ///
    /// Returns `false` if a link for `source` already existed; the existing
    /// link is kept.
    async fn record_link(
        &self,
        source: MessageRef,
        destination: MessageRef,
        kind: LinkKind,
    ) -> Result<bool, ParleyError>;

    /// Finds the source of the link whose destination is `destination`.
    async fn resolve_forward(
        &self,
        destination: MessageRef,
    ) -> Result<Option<MessageRef>, ParleyError>;

    /// Finds the destination of the link whose source is `source`.
    async fn resolve_reverse(&self, source: MessageRef) -> Result<Option<MessageRef>, ParleyError>;
}
