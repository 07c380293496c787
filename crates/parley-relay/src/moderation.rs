// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Moderation engine and the staff information commands.
//!
//! Ban and broadcast require the caller to be an administrator of the
//! feedback chat. A caller who is not, or whose status cannot be
//! determined, gets no answer at all.

use parley_core::{InboundMessage, MessageId, MessageRef, OutboundText, ParleyError};
use tracing::{debug, info, warn};

use crate::classify::BanTarget;
use crate::templates::render;
use crate::{DropReason, Outcome, Relay};

impl Relay {
    /// `true` if the sender administers the feedback chat.
    pub(crate) async fn is_admin(&self, msg: &InboundMessage) -> bool {
        let Some(sender) = msg.from.as_ref() else {
            return false;
        };
        match self
            .gateway
            .chat_administrators(self.settings.feedback_chat)
            .await
        {
            Ok(admins) => admins.contains(&sender.id),
            Err(e) => {
                warn!(error = %e, user_id = sender.id, "administrator lookup failed");
                false
            }
        }
    }

    /// Source chat of the relayed message `replied` in the feedback chat.
    async fn originator(&self, replied: MessageId) -> Result<Option<i64>, ParleyError> {
        let replied = MessageRef::new(self.settings.feedback_chat, replied);
        Ok(self
            .store
            .resolve_forward(replied)
            .await?
            .map(|origin| origin.chat.0))
    }

    /// `/ban` and `/unban`.
    pub(crate) async fn moderate(
        &self,
        msg: &InboundMessage,
        target: BanTarget,
        ban: bool,
    ) -> Result<Outcome, ParleyError> {
        if !self.is_admin(msg).await {
            debug!(message_id = msg.id.0, "moderation command from non-admin, ignoring");
            return Ok(Outcome::Dropped(DropReason::Unauthorized));
        }

        let user = match target {
            BanTarget::ById(id) => id,
            BanTarget::ByReply(replied) => match self.originator(replied).await? {
                Some(id) => id,
                None => return Ok(Outcome::Dropped(DropReason::UntrackedThread)),
            },
        };

        if self.store.set_ban(user, ban).await? {
            info!(user_id = user, banned = ban, "ban state updated");
        } else {
            debug!(user_id = user, "no identity matched, ban state unchanged");
        }

        let id = user.to_string();
        let template = if ban {
            &self.settings.texts.banned
        } else {
            &self.settings.texts.unbanned
        };
        let confirmation = render(template, &[("id", id.as_str())]);
        self.gateway
            .send_text(OutboundText::plain(msg.chat, confirmation).reply_to(Some(msg.id)))
            .await?;

        Ok(Outcome::Moderated { user, banned: ban })
    }

    /// `/id`, `/get_id`: reveal the originating chat of a relayed message.
    pub(crate) async fn get_id(
        &self,
        msg: &InboundMessage,
        replied: MessageId,
    ) -> Result<Outcome, ParleyError> {
        let Some(origin) = self.originator(replied).await? else {
            return Ok(Outcome::Dropped(DropReason::UntrackedThread));
        };
        self.gateway
            .send_text(OutboundText::plain(msg.chat, origin.to_string()))
            .await?;
        Ok(Outcome::Replied)
    }

    /// `/chat_id`: reveal the current chat id.
    pub(crate) async fn chat_id(&self, msg: &InboundMessage) -> Result<Outcome, ParleyError> {
        self.gateway
            .send_text(OutboundText::plain(msg.chat, msg.chat.to_string()).reply_to(Some(msg.id)))
            .await?;
        Ok(Outcome::Replied)
    }
}
