// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of Bot API failures onto the relay's delivery taxonomy.

use parley_core::{DeliveryError, ParleyError};
use teloxide::{ApiError, RequestError};

/// Classify a failed Bot API request.
///
/// Recipient-side outcomes and flood control become [`ParleyError::Delivery`];
/// transport failures stay [`ParleyError::Channel`].
pub fn classify(err: RequestError) -> ParleyError {
    match err {
        RequestError::RetryAfter(wait) => DeliveryError::RateLimited {
            retry_after: wait.duration(),
        }
        .into(),
        RequestError::Api(api) => classify_api(api).into(),
        other => ParleyError::Channel {
            message: format!("telegram request failed: {other}"),
            source: Some(Box::new(other)),
        },
    }
}

fn classify_api(err: ApiError) -> DeliveryError {
    match err {
        ApiError::BotBlocked => DeliveryError::Blocked,
        ApiError::ChatNotFound => DeliveryError::ChatNotFound,
        ApiError::UserDeactivated => DeliveryError::Deactivated,
        other => DeliveryError::Protocol(other.to_string()),
    }
}

/// `true` when an edit was rejected only because nothing changed.
pub fn is_not_modified(err: &RequestError) -> bool {
    matches!(err, RequestError::Api(ApiError::MessageNotModified))
}
