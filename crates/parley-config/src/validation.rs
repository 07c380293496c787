// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.

use crate::diagnostic::ConfigError;
use crate::model::ParleyConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    match config.relay.feedback_chat {
        None => errors.push(ConfigError::MissingKey {
            key: "relay.feedback_chat".to_string(),
        }),
        Some(0) => errors.push(ConfigError::Validation {
            message: "relay.feedback_chat must be a non-zero chat id".to_string(),
        }),
        Some(_) => {}
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.broadcast.max_attempts < 1 {
        errors.push(ConfigError::Validation {
            message: "broadcast.max_attempts must be at least 1".to_string(),
        });
    }

    if config.broadcast.progress_every < 1 {
        errors.push(ConfigError::Validation {
            message: "broadcast.progress_every must be at least 1".to_string(),
        });
    }

    for (name, command) in &config.commands {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            errors.push(ConfigError::Validation {
                message: format!(
                    "commands.{name}: command names may only contain letters, digits and `_`"
                ),
            });
        }
        if command.text.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("commands.{name}.text must not be empty"),
            });
        }
        if command.register_as_bot_command && command.description.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!(
                    "commands.{name}.description is required when register_as_bot_command = true"
                ),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
