// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for Mnemo memory fragments.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and the
//! [`SqliteFragmentStore`] implementation of the engine's
//! `FragmentStore` trait.

pub mod database;
pub mod migrations;
pub mod store;

pub use database::Database;
pub use store::SqliteFragmentStore;
