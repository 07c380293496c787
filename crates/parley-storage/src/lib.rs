// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Parley feedback relay.
//!
//! Provides the identity store (`users`) and the thread link table
//! (`thread_links`) behind a WAL-mode SQLite database with embedded
//! migrations and a single-writer model via `tokio-rusqlite`.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
