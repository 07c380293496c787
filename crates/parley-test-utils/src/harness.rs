// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end relay testing.
//!
//! `TestHarness` assembles a temp SQLite store, a [`MockChannel`] and a
//! config pointing at a feedback chat, ready to hand to the relay.

use std::sync::Arc;

use parley_config::model::{ParleyConfig, StorageConfig};
use parley_core::{ChatId, ParleyError, StorageAdapter};
use parley_storage::SqliteStorage;
use tempfile::TempDir;

use crate::mock_channel::MockChannel;

/// Feedback chat used by harnesses unless overridden.
pub const FEEDBACK_CHAT: i64 = -100_500;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: ParleyConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = ParleyConfig::default();
        config.relay.feedback_chat = Some(FEEDBACK_CHAT);
        config.broadcast.pacing_ms = 100;
        Self { config }
    }

    /// Adjust the config before the harness is built.
    pub fn configure(mut self, f: impl FnOnce(&mut ParleyConfig)) -> Self {
        f(&mut self.config);
        self
    }

    /// Build the harness: opens a fresh database in a temp directory.
    pub async fn build(self) -> Result<TestHarness, ParleyError> {
        let temp_dir = TempDir::new().map_err(|e| ParleyError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;

        Ok(TestHarness {
            channel: Arc::new(MockChannel::new()),
            storage: Arc::new(storage),
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete relay environment backed by mocks and a temp database.
pub struct TestHarness {
    pub channel: Arc<MockChannel>,
    pub storage: Arc<SqliteStorage>,
    pub config: ParleyConfig,
    _temp_dir: TempDir,
}

impl TestHarness {
    /// Create a builder with the default test config.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The configured feedback chat.
    pub fn feedback_chat(&self) -> ChatId {
        ChatId(self.config.relay.feedback_chat.unwrap_or(FEEDBACK_CHAT))
    }
}
