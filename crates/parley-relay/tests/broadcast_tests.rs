// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast fan-out, pacing and rate-limit recovery.
//!
//! Runs on a paused clock so retry waits and pacing are observable without
//! actually sleeping.

use std::time::Duration;

use parley_config::model::ParleyConfig;
use parley_core::{ChatId, DeliveryError, MessageContent, MessageId, MessageRef, StorageAdapter};
use parley_relay::{BroadcastSummary, DropReason, Outcome, Relay};
use parley_test_utils::{TestHarness, fixtures};
use tokio::time::Instant;

const ADMIN: i64 = 9;
const TEMPLATE: i64 = 50;

async fn setup_with(
    users: &[i64],
    configure: impl FnOnce(&mut ParleyConfig),
) -> (TestHarness, Relay) {
    let harness = TestHarness::builder()
        .configure(configure)
        .build()
        .await
        .unwrap();
    harness
        .channel
        .set_admins(harness.feedback_chat(), &[ADMIN])
        .await;
    for &id in users {
        harness
            .storage
            .ensure_registered(&fixtures::profile(id, "User"))
            .await
            .unwrap();
    }
    let relay = Relay::new(
        harness.channel.clone(),
        harness.storage.clone(),
        &harness.config,
    )
    .unwrap();
    (harness, relay)
}

async fn setup(users: &[i64]) -> (TestHarness, Relay) {
    setup_with(users, |_| {}).await
}

fn template(harness: &TestHarness) -> MessageRef {
    MessageRef::new(harness.feedback_chat(), MessageId(TEMPLATE))
}

fn edit_texts(edits: &[(MessageRef, MessageContent)]) -> Vec<String> {
    edits
        .iter()
        .filter_map(|(_, content)| content.text().map(str::to_string))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn every_registered_user_receives_one_copy() {
    let (harness, relay) = setup(&[1, 2, 3, 4, 5]).await;
    let admin = fixtures::profile(ADMIN, "Admin");

    let started = Instant::now();
    let outcome = relay
        .handle(fixtures::new_message(fixtures::group_text(
            harness.feedback_chat().0,
            &admin,
            60,
            "/broadcast",
            Some(TEMPLATE),
        )))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Broadcast(BroadcastSummary {
            total: 5,
            delivered: 5,
            ..BroadcastSummary::default()
        })
    );
    assert!(started.elapsed() >= Duration::from_millis(500));

    let copies = harness.channel.copies().await;
    let recipients: Vec<ChatId> = copies.iter().map(|(_, produced, _)| produced.chat).collect();
    assert_eq!(
        recipients,
        vec![ChatId(1), ChatId(2), ChatId(3), ChatId(4), ChatId(5)]
    );
    assert!(
        copies
            .iter()
            .all(|(source, _, reply_to)| *source == template(&harness) && reply_to.is_none())
    );

    let sent = harness.channel.sent_texts().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "Starting broadcast");
    assert_eq!(sent[0].chat, harness.feedback_chat());

    let texts = edit_texts(&harness.channel.edits().await);
    assert_eq!(texts.len(), 6);
    assert_eq!(texts[0], "Broadcast 1/5");
    assert_eq!(texts[4], "Broadcast 5/5");
    assert_eq!(
        texts[5],
        "Broadcast finished: 5/5 delivered, 0 blocked, 0 not found, 0 deactivated, 0 failed"
    );
}

#[tokio::test(start_paused = true)]
async fn blocked_and_rate_limited_recipients() {
    let (harness, relay) = setup(&[1, 2, 3]).await;
    harness
        .channel
        .fail_next(ChatId(2), DeliveryError::Blocked)
        .await;
    harness
        .channel
        .fail_next(
            ChatId(3),
            DeliveryError::RateLimited {
                retry_after: Duration::from_secs(3),
            },
        )
        .await;

    let started = Instant::now();
    let summary = relay
        .run_broadcast(harness.feedback_chat(), template(&harness))
        .await
        .unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.delivered, 2);
    assert_eq!(summary.blocked, 1);
    assert_eq!(summary.other_error, 0);
    assert_eq!(harness.channel.attempts_to(ChatId(2)).await, 1);
    assert_eq!(harness.channel.attempts_to(ChatId(3)).await, 2);
    assert!(started.elapsed() >= Duration::from_secs(3) + Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn persistent_rate_limit_gives_up_after_max_attempts() {
    let (harness, relay) = setup(&[1, 2]).await;
    harness
        .channel
        .fail_times(
            ChatId(1),
            DeliveryError::RateLimited {
                retry_after: Duration::from_secs(1),
            },
            5,
        )
        .await;

    let summary = relay
        .run_broadcast(harness.feedback_chat(), template(&harness))
        .await
        .unwrap();

    assert_eq!(summary.other_error, 1);
    assert_eq!(summary.delivered, 1);
    assert_eq!(harness.channel.attempts_to(ChatId(1)).await, 3);
}

#[tokio::test(start_paused = true)]
async fn other_failures_are_counted_by_kind() {
    let (harness, relay) = setup(&[1, 2, 3, 4]).await;
    let channel = &harness.channel;
    channel.fail_next(ChatId(1), DeliveryError::ChatNotFound).await;
    channel.fail_next(ChatId(2), DeliveryError::Deactivated).await;
    channel
        .fail_next(ChatId(3), DeliveryError::Protocol("bad request".into()))
        .await;

    let summary = relay
        .run_broadcast(harness.feedback_chat(), template(&harness))
        .await
        .unwrap();

    assert_eq!(
        summary,
        BroadcastSummary {
            total: 4,
            delivered: 1,
            blocked: 0,
            not_found: 1,
            deactivated: 1,
            other_error: 1,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn progress_updates_follow_configured_interval() {
    let (harness, relay) = setup_with(&[1, 2, 3, 4, 5], |config| {
        config.broadcast.progress_every = 2;
    })
    .await;

    relay
        .run_broadcast(harness.feedback_chat(), template(&harness))
        .await
        .unwrap();

    let texts = edit_texts(&harness.channel.edits().await);
    assert_eq!(
        texts[..3],
        ["Broadcast 1/5", "Broadcast 3/5", "Broadcast 5/5"]
    );
    assert_eq!(texts.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn failed_progress_message_does_not_stop_delivery() {
    let (harness, relay) = setup(&[1, 2]).await;
    harness
        .channel
        .fail_next(
            harness.feedback_chat(),
            DeliveryError::Protocol("not enough rights".into()),
        )
        .await;

    let summary = relay
        .run_broadcast(harness.feedback_chat(), template(&harness))
        .await
        .unwrap();

    assert_eq!(summary.delivered, 2);
    assert!(harness.channel.sent_texts().await.is_empty());
    assert!(harness.channel.edits().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn broadcast_with_no_users_reports_empty_summary() {
    let (harness, relay) = setup(&[]).await;

    let summary = relay
        .run_broadcast(harness.feedback_chat(), template(&harness))
        .await
        .unwrap();

    assert_eq!(summary, BroadcastSummary::default());
    assert!(harness.channel.copies().await.is_empty());
    let texts = edit_texts(&harness.channel.edits().await);
    assert_eq!(
        texts,
        vec!["Broadcast finished: 0/0 delivered, 0 blocked, 0 not found, 0 deactivated, 0 failed"]
    );
}

#[tokio::test(start_paused = true)]
async fn non_admin_cannot_broadcast() {
    let (harness, relay) = setup(&[1, 2]).await;
    let member = fixtures::profile(10, "Member");

    let outcome = relay
        .handle(fixtures::new_message(fixtures::group_text(
            harness.feedback_chat().0,
            &member,
            61,
            "/broadcast",
            Some(TEMPLATE),
        )))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Dropped(DropReason::Unauthorized));
    assert!(harness.channel.calls().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn banned_users_still_receive_broadcasts() {
    let (harness, relay) = setup(&[1, 2]).await;
    harness.storage.set_ban(2, true).await.unwrap();

    let summary = relay
        .run_broadcast(harness.feedback_chat(), template(&harness))
        .await
        .unwrap();

    assert_eq!(summary.delivered, 2);
}
