// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parley feedback relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;
use std::time::Duration;

use parley_core::FormattingMode;
use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// Every section except `relay.feedback_chat` has a usable default.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Relay routing settings.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Broadcast pacing and retry settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Every user and staff facing string.
    #[serde(default)]
    pub texts: TextsConfig,

    /// End-user command table, keyed by command name without the slash.
    #[serde(default = "default_commands")]
    pub commands: BTreeMap<String, CommandConfig>,
}

impl Default for ParleyConfig {
    fn default() -> Self {
        Self {
            bot: BotConfig::default(),
            telegram: TelegramConfig::default(),
            storage: StorageConfig::default(),
            relay: RelayConfig::default(),
            broadcast: BroadcastConfig::default(),
            texts: TextsConfig::default(),
            commands: default_commands(),
        }
    }
}

impl ParleyConfig {
    /// A copy safe to print: secrets are replaced with a marker.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.telegram.bot_token.is_some() {
            copy.telegram.bot_token = Some("[REDACTED]".to_string());
        }
        copy
    }
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name used in logs.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_bot_name() -> String {
    "parley".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `parley serve`.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("parley").join("parley.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("parley.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Relay routing configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Chat id of the staff feedback chat. Required.
    #[serde(default)]
    pub feedback_chat: Option<i64>,
}

/// Broadcast pacing and rate-limit recovery.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BroadcastConfig {
    /// Delay between two recipients, in milliseconds.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Total delivery attempts per recipient while rate limited.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Update the progress message every N recipients.
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
}

impl BroadcastConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
            max_attempts: default_max_attempts(),
            progress_every: default_progress_every(),
        }
    }
}

fn default_pacing_ms() -> u64 {
    100
}

fn default_max_attempts() -> u32 {
    3
}

fn default_progress_every() -> usize {
    1
}

/// User and staff facing strings.
///
/// Placeholders in braces are substituted at send time: `{user}`,
/// `{command}`, `{id}`, `{current}`, `{total}`, and the broadcast counters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TextsConfig {
    /// Header posted in the feedback chat before each forwarded message.
    #[serde(default = "default_new_message")]
    pub new_message: String,

    /// Answer to an unrecognized end-user command.
    #[serde(default = "default_unknown_command")]
    pub unknown_command: String,

    /// Feedback chat notice when a user runs a command.
    #[serde(default = "default_command_notice")]
    pub command_notice: String,

    /// Confirmation after a ban.
    #[serde(default = "default_banned")]
    pub banned: String,

    /// Confirmation after an unban.
    #[serde(default = "default_unbanned")]
    pub unbanned: String,

    /// Initial broadcast progress message.
    #[serde(default = "default_broadcast_started")]
    pub broadcast_started: String,

    /// Broadcast progress update.
    #[serde(default = "default_broadcast_progress")]
    pub broadcast_progress: String,

    /// Final broadcast summary.
    #[serde(default = "default_broadcast_finished")]
    pub broadcast_finished: String,
}

impl Default for TextsConfig {
    fn default() -> Self {
        Self {
            new_message: default_new_message(),
            unknown_command: default_unknown_command(),
            command_notice: default_command_notice(),
            banned: default_banned(),
            unbanned: default_unbanned(),
            broadcast_started: default_broadcast_started(),
            broadcast_progress: default_broadcast_progress(),
            broadcast_finished: default_broadcast_finished(),
        }
    }
}

fn default_new_message() -> String {
    "New message from {user}".to_string()
}

fn default_unknown_command() -> String {
    "Unknown command".to_string()
}

fn default_command_notice() -> String {
    "User sent command /{command}\n\n{user}".to_string()
}

fn default_banned() -> String {
    "Banned {id}. Use /unban to lift the ban.".to_string()
}

fn default_unbanned() -> String {
    "Unbanned {id}".to_string()
}

fn default_broadcast_started() -> String {
    "Starting broadcast".to_string()
}

fn default_broadcast_progress() -> String {
    "Broadcast {current}/{total}".to_string()
}

fn default_broadcast_finished() -> String {
    "Broadcast finished: {delivered}/{total} delivered, {blocked} blocked, \
     {not_found} not found, {deactivated} deactivated, {other_error} failed"
        .to_string()
}

/// One entry of the end-user command table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    /// Reply text.
    pub text: String,

    /// Description shown in the command menu.
    #[serde(default)]
    pub description: String,

    /// Suppress link previews in the reply.
    #[serde(default)]
    pub disable_preview: bool,

    /// Markup of the reply text.
    #[serde(default)]
    pub formatting: FormattingMode,

    /// Publish this command in the platform command menu.
    #[serde(default = "default_register_as_bot_command")]
    pub register_as_bot_command: bool,
}

fn default_register_as_bot_command() -> bool {
    true
}

fn default_commands() -> BTreeMap<String, CommandConfig> {
    let mut commands = BTreeMap::new();
    commands.insert(
        "start".to_string(),
        CommandConfig {
            text: "Hello! This is the support bot.".to_string(),
            description: String::new(),
            disable_preview: false,
            formatting: FormattingMode::Markdown,
            register_as_bot_command: false,
        },
    );
    commands
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            description: String::new(),
            disable_preview: false,
            formatting: FormattingMode::default(),
            register_as_bot_command: default_register_as_bot_command(),
        }
    }
}
