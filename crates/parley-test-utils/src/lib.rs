// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley integration tests.
//!
//! Provides a scripted gateway and a temp-database harness for fast,
//! deterministic, CI-runnable tests without a live Bot API.
//!
//! # Components
//!
//! - [`MockChannel`] - Mock gateway with event injection, call capture and scripted failures
//! - [`TestHarness`] - Temp SQLite storage plus a mock gateway and a ready config
//! - [`fixtures`] - Builders for inbound messages

pub mod fixtures;
pub mod harness;
pub mod mock_channel;

pub use harness::TestHarness;
pub use mock_channel::{Call, MockChannel};
