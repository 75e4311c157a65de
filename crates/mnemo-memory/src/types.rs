// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transient engine types: ranked results, assembled context, and the
//! JSON-facing record and statistics shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use mnemo_core::MemoryFragment;
use serde::{Deserialize, Serialize};

fn iso(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// A fragment with its per-query relevance score.
#[derive(Debug, Clone)]
pub struct ScoredFragment {
    /// The stored fragment.
    pub fragment: MemoryFragment,
    /// Relevance score for the current query (importance + overlap +
    /// access frequency + age).
    pub score: f64,
}

/// Rich conversation context assembled for a single query.
///
/// Transient and never persisted.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    /// Owning conversation.
    pub session_id: String,
    /// Count of question+answer fragments in the session, plus one.
    pub current_turn: usize,
    /// Ranked relevant fragments, best first.
    pub relevant_memories: Vec<ScoredFragment>,
    /// Preferences parsed from `preference` fragments, keyed by verb.
    pub user_preferences: BTreeMap<String, String>,
    /// The 5 most frequent keywords among the relevant set.
    pub conversation_themes: Vec<String>,
    /// Up to 10 entities drawn from the top-5 relevant fragments.
    pub recent_entities: Vec<String>,
    /// Opaque caller-specific state. The engine never reads it.
    pub session_scratch: BTreeMap<String, serde_json::Value>,
}

impl ConversationContext {
    /// A neutral context for a session with no usable memory.
    pub fn empty(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            current_turn: 1,
            relevant_memories: Vec::new(),
            user_preferences: BTreeMap::new(),
            conversation_themes: Vec::new(),
            recent_entities: Vec::new(),
            session_scratch: BTreeMap::new(),
        }
    }
}

/// JSON-serializable view of a stored fragment for the read API.
///
/// Keyword and entity sets are sorted here so externally observable
/// output is deterministic regardless of internal ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentRecord {
    pub fragment_id: String,
    pub content: String,
    pub content_type: String,
    pub importance_score: f64,
    pub keywords: Vec<String>,
    pub entities: Vec<String>,
    /// ISO-8601 creation time.
    pub timestamp: String,
    pub access_count: i64,
    /// ISO-8601 last access time, if ever accessed.
    pub last_accessed: Option<String>,
}

impl From<&MemoryFragment> for FragmentRecord {
    fn from(fragment: &MemoryFragment) -> Self {
        let mut keywords = fragment.keywords.clone();
        keywords.sort();
        let mut entities = fragment.entities.clone();
        entities.sort();
        Self {
            fragment_id: fragment.fragment_id.clone(),
            content: fragment.content.clone(),
            content_type: fragment.content_type.as_str().to_string(),
            importance_score: fragment.importance_score,
            keywords,
            entities,
            timestamp: iso(fragment.timestamp),
            access_count: fragment.access_count,
            last_accessed: fragment.last_accessed.map(iso),
        }
    }
}

/// Per-content-type aggregate for [`MemoryStats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeStats {
    pub count: usize,
    pub avg_importance: f64,
    pub total_access: i64,
}

/// Session-level memory statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Total fragments stored for the session.
    pub total: usize,
    /// Aggregates keyed by content type name.
    pub by_type: BTreeMap<String, TypeStats>,
    /// The 5 most accessed fragments.
    pub top_accessed: Vec<FragmentRecord>,
    /// "good" while under capacity, "needs_cleanup" otherwise.
    pub health: String,
}

impl Default for MemoryStats {
    fn default() -> Self {
        Self {
            total: 0,
            by_type: BTreeMap::new(),
            top_accessed: Vec::new(),
            health: "good".to_string(),
        }
    }
}
