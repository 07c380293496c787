// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley serve` command implementation.
//!
//! Opens the SQLite store, connects the Telegram gateway, publishes the
//! command menu and runs the relay loop until SIGINT or SIGTERM.

use std::sync::Arc;

use parley_config::model::ParleyConfig;
use parley_core::{ChannelAdapter, ParleyError, PluginAdapter, StorageAdapter};
use parley_relay::{Relay, recording, shutdown};
use parley_storage::SqliteStorage;
use parley_telegram::TelegramChannel;
use tracing::{info, warn};

/// Runs the `parley serve` command.
pub async fn run_serve(config: ParleyConfig) -> Result<(), ParleyError> {
    init_tracing(&config.bot.log_level);
    recording::register_metrics();

    info!(name = %config.bot.name, "starting parley serve");

    let storage = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };
    info!(path = %config.storage.database_path, "storage ready");

    let gateway = {
        let mut telegram = TelegramChannel::new(&config.telegram)?;
        telegram.connect().await?;
        Arc::new(telegram)
    };

    let relay = Relay::new(gateway.clone(), storage.clone(), &config)?;

    if let Err(e) = relay.register_commands().await {
        warn!(error = %e, "failed to register bot commands, continuing");
    }

    let cancel = shutdown::install_signal_handler();
    let result = relay.run(cancel).await;

    if let Err(e) = gateway.shutdown().await {
        warn!(error = %e, "gateway shutdown failed");
    }
    if let Err(e) = storage.close().await {
        warn!(error = %e, "storage close failed");
    }

    info!("parley serve stopped");
    result
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
