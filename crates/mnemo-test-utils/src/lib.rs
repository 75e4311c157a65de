// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mnemo integration tests.
//!
//! Provides mock collaborators for fast, deterministic, CI-runnable
//! tests without a real database.

pub mod mock_store;

pub use mock_store::MockFragmentStore;
