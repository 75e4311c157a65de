// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fragment domain types shared across the memory engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The five kinds of content a memory fragment can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// A user question.
    Question,
    /// A generated answer.
    Answer,
    /// Surrounding conversational context.
    Context,
    /// A detected user preference.
    Preference,
    /// A detected factual statement.
    Fact,
}

impl ContentType {
    /// Convert to string for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Question => "question",
            ContentType::Answer => "answer",
            ContentType::Context => "context",
            ContentType::Preference => "preference",
            ContentType::Fact => "fact",
        }
    }

    /// Parse from a storage string. Unknown values fall back to `Context`.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "question" => ContentType::Question,
            "answer" => ContentType::Answer,
            "preference" => ContentType::Preference,
            "fact" => ContentType::Fact,
            _ => ContentType::Context,
        }
    }
}

/// A single stored unit of conversational memory.
///
/// Immutable after creation except for the two access-tracking fields,
/// which are advisory and may lose increments under races.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryFragment {
    /// Unique identifier, derived from session id + creation time + content hash.
    pub fragment_id: String,
    /// Owning conversation. Fragments never move between sessions.
    pub session_id: String,
    /// The fragment text.
    pub content: String,
    /// Kind of content stored.
    pub content_type: ContentType,
    /// Creation time. Immutable.
    pub timestamp: DateTime<Utc>,
    /// Static significance in [0, 1], assigned at creation. Immutable.
    pub importance_score: f64,
    /// Up to 10 keywords, deduplicated, first-seen order. Set semantics:
    /// iteration order carries no meaning and is sorted at output boundaries.
    pub keywords: Vec<String>,
    /// Up to 15 entities, same semantics as `keywords`.
    pub entities: Vec<String>,
    /// Weak references to other fragment ids. Informational only, never
    /// traversed for ownership.
    pub related_fragments: Vec<String>,
    /// Times this fragment was returned by a relevance query. Non-decreasing.
    pub access_count: i64,
    /// When the fragment was last returned by a relevance query.
    pub last_accessed: Option<DateTime<Utc>>,
}

impl MemoryFragment {
    /// Elapsed time since creation, in fractional days.
    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        (now - self.timestamp).num_seconds() as f64 / 86_400.0
    }
}
