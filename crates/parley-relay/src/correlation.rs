// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Correlation engine: user requests into the feedback chat, staff answers
//! back to users, and edit propagation.
//!
//! A link is only recorded after the gateway confirmed the delivery it
//! describes. A crash between the two leaves a delivered message without a
//! link; replies to it are then dropped as untracked.

use parley_core::{
    InboundMessage, LinkKind, MessageId, MessageRef, OutboundText, ParleyError,
};
use tracing::{debug, info};

use crate::templates::render;
use crate::{DropReason, Outcome, Relay};

impl Relay {
    /// Forward a user-side message into the feedback chat.
    ///
    /// Registers the sender, drops silently if banned, then posts a header
    /// naming the sender (threaded into the existing conversation when the
    /// message replies to a relayed one) followed by the forwarded message.
    pub(crate) async fn feedback_request(
        &self,
        msg: &InboundMessage,
    ) -> Result<Outcome, ParleyError> {
        let Some(sender) = msg.from.as_ref() else {
            return Ok(Outcome::Dropped(DropReason::NoSender));
        };

        if self.store.ensure_registered(sender).await? {
            info!(user_id = sender.id, "registered new identity");
        }

        if self.store.is_banned(sender.id).await? {
            debug!(
                user_id = sender.id,
                message_id = msg.id.0,
                "sender is banned, dropping message"
            );
            return Ok(Outcome::Rejected);
        }

        let thread = match msg.reply_to {
            Some(replied) => self.resolve_thread(MessageRef::new(msg.chat, replied)).await?,
            None => None,
        };

        let feedback_chat = self.settings.feedback_chat;
        let title = sender.title();
        let header = render(&self.settings.texts.new_message, &[("user", title.as_str())]);
        self.gateway
            .send_text(OutboundText::plain(feedback_chat, header).reply_to(thread))
            .await?;

        let forwarded = self.gateway.forward(msg.reference(), feedback_chat).await?;
        self.store
            .record_link(msg.reference(), forwarded, LinkKind::Request)
            .await?;

        debug!(
            user_id = sender.id,
            message_id = msg.id.0,
            forwarded_id = forwarded.id.0,
            threaded = thread.is_some(),
            "request forwarded"
        );
        Ok(Outcome::Forwarded(forwarded))
    }

    /// Feedback chat message a user-side reply continues, if any.
    ///
    /// The replied-to message is first treated as the user's own relayed
    /// request (its forwarded copy), then as a copy of a staff answer (the
    /// staff message it was copied from). Only feedback chat results count.
    pub async fn resolve_thread(
        &self,
        replied: MessageRef,
    ) -> Result<Option<MessageId>, ParleyError> {
        let feedback_chat = self.settings.feedback_chat;

        if let Some(copy) = self.store.resolve_reverse(replied).await?
            && copy.chat == feedback_chat
        {
            return Ok(Some(copy.id));
        }

        if let Some(origin) = self.store.resolve_forward(replied).await?
            && origin.chat == feedback_chat
        {
            return Ok(Some(origin.id));
        }

        Ok(None)
    }

    /// Copy a staff reply back to the user whose message it answers.
    pub(crate) async fn feedback_answer(
        &self,
        msg: &InboundMessage,
        replied: MessageId,
    ) -> Result<Outcome, ParleyError> {
        let replied = MessageRef::new(self.settings.feedback_chat, replied);
        let Some(origin) = self.store.resolve_forward(replied).await? else {
            debug!(
                replied_id = replied.id.0,
                "reply to an untracked message, ignoring"
            );
            return Ok(Outcome::Dropped(DropReason::UntrackedThread));
        };

        let copy = self
            .gateway
            .copy(msg.reference(), origin.chat, Some(origin.id))
            .await?;
        self.store
            .record_link(msg.reference(), copy, LinkKind::Response)
            .await?;

        debug!(
            user_chat = origin.chat.0,
            message_id = msg.id.0,
            copy_id = copy.id.0,
            "answer delivered"
        );
        Ok(Outcome::Answered(copy))
    }

    /// Mirror an edit of a feedback chat message onto its linked copy.
    pub(crate) async fn propagate_edit(
        &self,
        msg: &InboundMessage,
    ) -> Result<Outcome, ParleyError> {
        let Some(copy) = self.store.resolve_reverse(msg.reference()).await? else {
            debug!(message_id = msg.id.0, "edited message has no linked copy");
            return Ok(Outcome::Dropped(DropReason::UntrackedThread));
        };

        self.gateway.edit(copy, &msg.content).await?;
        debug!(
            message_id = msg.id.0,
            copy_chat = copy.chat.0,
            copy_id = copy.id.0,
            "edit propagated"
        );
        Ok(Outcome::Edited(copy))
    }
}
