// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mnemo memory engine.
//!
//! This crate provides the fragment domain model, the shared error type,
//! and the trait definitions at the engine's two seams: the persistence
//! collaborator ([`FragmentStore`]) and the extraction heuristic
//! ([`FragmentExtractor`]).

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MnemoError;
pub use traits::{FragmentExtractor, FragmentStore};
pub use types::{ContentType, MemoryFragment};
