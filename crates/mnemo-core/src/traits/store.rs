// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence trait for memory fragments.

use async_trait::async_trait;

use crate::error::MnemoError;
use crate::types::{ContentType, MemoryFragment};

/// Durable CRUD for memory fragments, keyed by session.
///
/// The engine fetches a session's fragment set and performs all
/// scoring and ranking in-process; implementations only need indexed
/// per-session retrieval, not ranking or full-text search.
///
/// Any failure to reach the backing store surfaces as
/// [`MnemoError::Storage`]. The facade layer catches it and degrades
/// gracefully; lower layers just propagate with `?`.
#[async_trait]
pub trait FragmentStore: Send + Sync {
    /// Persist a new fragment.
    async fn insert(&self, fragment: &MemoryFragment) -> Result<(), MnemoError>;

    /// Fetch every fragment belonging to a session.
    async fn find_by_session(&self, session_id: &str) -> Result<Vec<MemoryFragment>, MnemoError>;

    /// Increment a fragment's access count and stamp `last_accessed`.
    ///
    /// Must be an atomic in-place increment, not read-modify-write,
    /// so concurrent retrievals cannot lose updates.
    async fn increment_access(&self, fragment_id: &str) -> Result<(), MnemoError>;

    /// Delete the given fragments by id.
    async fn delete_many(&self, fragment_ids: &[String]) -> Result<usize, MnemoError>;

    /// Delete every fragment belonging to a session (explicit teardown).
    async fn delete_session(&self, session_id: &str) -> Result<usize, MnemoError>;

    /// Count all fragments in a session.
    async fn count(&self, session_id: &str) -> Result<usize, MnemoError>;

    /// Count fragments in a session matching any of the given content types.
    async fn count_by_types(
        &self,
        session_id: &str,
        content_types: &[ContentType],
    ) -> Result<usize, MnemoError>;
}
