// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mnemo memory engine.

use thiserror::Error;

/// The primary error type used across the memory engine and its adapters.
///
/// None of these variants escape the [`MemoryService`] facade boundary;
/// they exist so internal layers can report precisely what went wrong
/// before the facade degrades to a neutral result.
///
/// [`MemoryService`]: https://docs.rs/mnemo-memory
#[derive(Debug, Error)]
pub enum MnemoError {
    /// Storage backend errors (database connection, query failure, serialization).
    /// Covers the "storage unavailable" degradation path.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Keyword/entity extraction failed for a piece of content.
    /// The offending fragment is skipped; the caller is never failed.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// Relevance scoring produced a non-finite value for one fragment.
    /// That fragment is excluded from ranking; the rest continue.
    #[error("scoring error: {0}")]
    Scoring(String),

    /// Eviction or decay sweep failed. Logged and retried on the next trigger.
    #[error("retention error: {0}")]
    Retention(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
