// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The inbound event loop.
//!
//! Events are pulled from the gateway one at a time and each is handled on
//! its own task, so a long broadcast never holds up ordinary relaying.

use std::time::Duration;

use parley_core::{InboundEvent, ParleyError};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{Relay, shutdown};

/// How long in-flight events may run after cancellation.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

impl Relay {
    /// Runs the relay until the cancellation token is triggered or the
    /// gateway stream closes.
    ///
    /// On exit, in-flight event tasks are given [`DRAIN_TIMEOUT`] to finish
    /// and are aborted after that.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), ParleyError> {
        self.run_with_drain(cancel, DRAIN_TIMEOUT).await
    }

    pub async fn run_with_drain(
        &self,
        cancel: CancellationToken,
        drain_timeout: Duration,
    ) -> Result<(), ParleyError> {
        info!(feedback_chat = self.settings.feedback_chat.0, "relay loop running");
        let mut tasks: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                event = self.gateway.receive() => {
                    match event {
                        Ok(event) => {
                            let relay = self.clone();
                            tasks.spawn(async move { relay.dispatch(event).await });
                        }
                        Err(e) => {
                            error!(error = %e, "gateway receive error, stopping relay loop");
                            break;
                        }
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "event task panicked");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping relay loop");
                    break;
                }
            }
        }

        shutdown::drain_tasks(&mut tasks, drain_timeout).await;
        info!("relay loop stopped");
        Ok(())
    }

    /// Handle one event, logging instead of propagating failures.
    async fn dispatch(&self, event: InboundEvent) {
        let chat_id = event.message().chat.0;
        let message_id = event.message().id.0;

        match self.handle(event).await {
            Ok(outcome) => debug!(chat_id, message_id, ?outcome, "event handled"),
            Err(e) if e.delivery().is_some() => {
                warn!(chat_id, message_id, error = %e, "delivery failed while handling event");
            }
            Err(e) => error!(chat_id, message_id, error = %e, "failed to handle inbound event"),
        }
    }
}
