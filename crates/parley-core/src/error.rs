// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parley feedback relay.

use std::time::Duration;

use thiserror::Error;

/// Classified failure of a single delivery through the messaging gateway.
///
/// Gateway adapters map their platform-specific errors into these variants
/// so the relay engines can decide between retrying, skipping, and aborting
/// without knowing anything about the platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The recipient blocked the bot.
    #[error("blocked by recipient")]
    Blocked,

    /// The target chat does not exist or the bot never talked to it.
    #[error("chat not found")]
    ChatNotFound,

    /// The recipient account was deleted or deactivated.
    #[error("recipient deactivated")]
    Deactivated,

    /// Flood control: the platform asks to wait before the next request.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// Any other protocol-level failure reported by the platform.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// The primary error type used across all Parley adapter traits and engines.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Gateway adapter errors that are not tied to a delivery
    /// (closed inbound stream, malformed identifiers).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A delivery through the gateway failed.
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    /// A record that the caller required does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    /// Returns the classified delivery failure, if this is one.
    pub fn delivery(&self) -> Option<&DeliveryError> {
        match self {
            ParleyError::Delivery(kind) => Some(kind),
            _ => None,
        }
    }

    /// Returns `true` for [`ParleyError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, ParleyError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_errors_convert_into_parley_error() {
        let err: ParleyError = DeliveryError::Blocked.into();
        assert_eq!(err.delivery(), Some(&DeliveryError::Blocked));
        assert!(!err.is_not_found());
    }

    #[test]
    fn rate_limited_display_includes_wait() {
        let err = DeliveryError::RateLimited {
            retry_after: Duration::from_secs(7),
        };
        assert_eq!(err.to_string(), "rate limited, retry after 7s");
    }

    #[test]
    fn not_found_display() {
        let err = ParleyError::NotFound {
            entity: "identity",
            key: "42".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "identity not found: 42");
        assert!(err.delivery().is_none());
    }
}
