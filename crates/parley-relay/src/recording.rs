// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics. Without an installed recorder the calls are
//! no-ops.

use metrics::describe_counter;

use crate::Outcome;
use crate::broadcast::DeliveryOutcome;

/// Register all Parley metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "parley_relayed_messages_total",
        "Messages relayed across the boundary, by kind"
    );
    describe_counter!(
        "parley_dropped_messages_total",
        "Inbound messages dropped without delivery, by reason"
    );
    describe_counter!(
        "parley_broadcast_deliveries_total",
        "Broadcast recipients processed, by outcome"
    );
    describe_counter!("parley_bans_total", "Ban state changes, by action");
}

/// Record the outcome of one handled event.
pub fn record_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Forwarded(_) => record_relayed("request"),
        Outcome::Answered(_) => record_relayed("response"),
        Outcome::Edited(_) => record_relayed("edit"),
        Outcome::Rejected => record_dropped("banned"),
        Outcome::Dropped(reason) => record_dropped((*reason).into()),
        Outcome::Moderated { banned, .. } => {
            let action = if *banned { "ban" } else { "unban" };
            metrics::counter!("parley_bans_total", "action" => action).increment(1);
        }
        Outcome::Broadcast(_) | Outcome::Command { .. } | Outcome::Replied => {}
    }
}

fn record_relayed(kind: &'static str) {
    metrics::counter!("parley_relayed_messages_total", "kind" => kind).increment(1);
}

fn record_dropped(reason: &'static str) {
    metrics::counter!("parley_dropped_messages_total", "reason" => reason).increment(1);
}

/// Record one broadcast recipient.
pub fn record_broadcast_delivery(outcome: DeliveryOutcome) {
    let label: &'static str = outcome.into();
    metrics::counter!("parley_broadcast_deliveries_total", "outcome" => label).increment(1);
}
