// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast engine: fan-out of one feedback chat message to every
//! registered identity.
//!
//! Recipients are processed one at a time with a fixed pacing delay.
//! Rate-limited deliveries are retried after the server-specified wait, up
//! to `broadcast.max_attempts` attempts in total. Every other failure is
//! counted and skipped; nothing a single recipient does aborts the run.

use parley_core::{
    ChannelAdapter, ChatId, DeliveryError, InboundMessage, MessageContent, MessageId, MessageRef,
    OutboundText, ParleyError,
};
use strum::IntoStaticStr;
use tracing::{debug, error, info, warn};

use crate::templates::render;
use crate::{DropReason, Outcome, Relay, recording};

/// Final state of one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    Blocked,
    NotFound,
    Deactivated,
    OtherError,
}

/// Per-outcome counts of a finished broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastSummary {
    pub total: usize,
    pub delivered: usize,
    pub blocked: usize,
    pub not_found: usize,
    pub deactivated: usize,
    pub other_error: usize,
}

impl BroadcastSummary {
    fn record(&mut self, outcome: DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered => self.delivered += 1,
            DeliveryOutcome::Blocked => self.blocked += 1,
            DeliveryOutcome::NotFound => self.not_found += 1,
            DeliveryOutcome::Deactivated => self.deactivated += 1,
            DeliveryOutcome::OtherError => self.other_error += 1,
        }
    }

    fn render(&self, template: &str) -> String {
        let total = self.total.to_string();
        let delivered = self.delivered.to_string();
        let blocked = self.blocked.to_string();
        let not_found = self.not_found.to_string();
        let deactivated = self.deactivated.to_string();
        let other_error = self.other_error.to_string();
        render(
            template,
            &[
                ("total", total.as_str()),
                ("delivered", delivered.as_str()),
                ("blocked", blocked.as_str()),
                ("not_found", not_found.as_str()),
                ("deactivated", deactivated.as_str()),
                ("other_error", other_error.as_str()),
            ],
        )
    }
}

/// Copy `source` to `to`, backing off while rate limited.
///
/// Makes at most `max_attempts` attempts (at least one). A recipient still
/// rate limited after the last attempt counts as [`DeliveryOutcome::OtherError`].
pub async fn deliver_copy(
    gateway: &dyn ChannelAdapter,
    source: MessageRef,
    to: ChatId,
    max_attempts: u32,
) -> DeliveryOutcome {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let err = match gateway.copy(source, to, None).await {
            Ok(_) => {
                debug!(user_id = to.0, attempt, "broadcast delivered");
                return DeliveryOutcome::Delivered;
            }
            Err(err) => err,
        };

        match err.delivery() {
            Some(DeliveryError::RateLimited { retry_after }) if attempt < max_attempts => {
                let wait = *retry_after;
                warn!(
                    user_id = to.0,
                    attempt,
                    wait_secs = wait.as_secs_f64(),
                    "flood limit exceeded, backing off"
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Some(DeliveryError::RateLimited { .. }) => {
                error!(user_id = to.0, attempt, "still rate limited, giving up on recipient");
                return DeliveryOutcome::OtherError;
            }
            Some(DeliveryError::Blocked) => {
                error!(user_id = to.0, "blocked by user");
                return DeliveryOutcome::Blocked;
            }
            Some(DeliveryError::ChatNotFound) => {
                error!(user_id = to.0, "invalid user id, chat not found");
                return DeliveryOutcome::NotFound;
            }
            Some(DeliveryError::Deactivated) => {
                error!(user_id = to.0, "user is deactivated");
                return DeliveryOutcome::Deactivated;
            }
            _ => {
                error!(user_id = to.0, error = %err, "broadcast delivery failed");
                return DeliveryOutcome::OtherError;
            }
        }
    }
}

impl Relay {
    /// `/broadcast` as a reply: admin check, then fan out the replied message.
    pub(crate) async fn broadcast(
        &self,
        msg: &InboundMessage,
        template: MessageId,
    ) -> Result<Outcome, ParleyError> {
        if !self.is_admin(msg).await {
            debug!(message_id = msg.id.0, "broadcast from non-admin, ignoring");
            return Ok(Outcome::Dropped(DropReason::Unauthorized));
        }

        let summary = self
            .run_broadcast(msg.chat, MessageRef::new(msg.chat, template))
            .await?;
        Ok(Outcome::Broadcast(summary))
    }

    /// Deliver `template` to every registered identity, reporting progress
    /// in `report_chat`.
    ///
    /// Only the initial store read can fail the run; progress messages are
    /// best effort.
    pub async fn run_broadcast(
        &self,
        report_chat: ChatId,
        template: MessageRef,
    ) -> Result<BroadcastSummary, ParleyError> {
        let texts = &self.settings.texts;
        let config = &self.settings.broadcast;

        let recipients = self.store.list_identity_ids().await?;
        let total = recipients.len();
        info!(total, template_id = template.id.0, "broadcast started");

        let progress = match self
            .gateway
            .send_text(OutboundText::plain(report_chat, texts.broadcast_started.clone()))
            .await
        {
            Ok(progress) => Some(progress),
            Err(e) => {
                warn!(error = %e, "could not post broadcast progress message");
                None
            }
        };

        let mut summary = BroadcastSummary {
            total,
            ..BroadcastSummary::default()
        };
        let every = config.progress_every.max(1);
        let total_label = total.to_string();

        for (index, user) in recipients.into_iter().enumerate() {
            if let Some(progress) = progress
                && index % every == 0
            {
                let current = (index + 1).to_string();
                let text = render(
                    &texts.broadcast_progress,
                    &[("current", current.as_str()), ("total", total_label.as_str())],
                );
                self.update_progress(progress, text).await;
            }

            let outcome =
                deliver_copy(self.gateway.as_ref(), template, ChatId(user), config.max_attempts)
                    .await;
            recording::record_broadcast_delivery(outcome);
            summary.record(outcome);

            tokio::time::sleep(config.pacing()).await;
        }

        if let Some(progress) = progress {
            self.update_progress(progress, summary.render(&texts.broadcast_finished))
                .await;
        }

        info!(
            total = summary.total,
            delivered = summary.delivered,
            blocked = summary.blocked,
            not_found = summary.not_found,
            deactivated = summary.deactivated,
            other_error = summary.other_error,
            "broadcast finished"
        );
        Ok(summary)
    }

    async fn update_progress(&self, progress: MessageRef, text: String) {
        if let Err(e) = self
            .gateway
            .edit(progress, &MessageContent::plain(text))
            .await
        {
            warn!(error = %e, "broadcast progress update failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_each_outcome() {
        let mut summary = BroadcastSummary {
            total: 5,
            ..BroadcastSummary::default()
        };
        for outcome in [
            DeliveryOutcome::Delivered,
            DeliveryOutcome::Delivered,
            DeliveryOutcome::Blocked,
            DeliveryOutcome::NotFound,
            DeliveryOutcome::OtherError,
        ] {
            summary.record(outcome);
        }
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.blocked, 1);
        assert_eq!(summary.not_found, 1);
        assert_eq!(summary.deactivated, 0);
        assert_eq!(summary.other_error, 1);
    }

    #[test]
    fn summary_renders_into_template() {
        let summary = BroadcastSummary {
            total: 3,
            delivered: 2,
            blocked: 1,
            ..BroadcastSummary::default()
        };
        assert_eq!(
            summary.render("{delivered}/{total} ok, {blocked} blocked"),
            "2/3 ok, 1 blocked"
        );
    }

    #[test]
    fn outcome_labels() {
        let label: &'static str = DeliveryOutcome::OtherError.into();
        assert_eq!(label, "other_error");
    }
}
