// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! High-level memory facade.
//!
//! [`MemoryService`] is the only type callers need: it captures
//! interactions, derives preference and fact fragments, assembles
//! context, and runs retention. Storage failures degrade to neutral
//! values rather than surfacing to the conversation loop.

use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::warn;

use mnemo_config::MemoryConfig;
use mnemo_core::{ContentType, FragmentExtractor, FragmentStore, MemoryFragment};

use crate::assembler::{ContextAssembler, format_for_prompt};
use crate::extract::{BUSINESS_VOCAB_RE, HeuristicExtractor, score_importance};
use crate::retention::RetentionManager;
use crate::scorer::RelevanceScorer;
use crate::types::{ConversationContext, FragmentRecord, MemoryStats, TypeStats};

static STATED_PREFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bi (prefer|like|want|need) (.+?)(?:\.|$)").unwrap());
static HABIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(always|never) (.+?)(?:\.|$)").unwrap());
static FAVORITE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bmy favorite (.+?) is (.+?)(?:\.|$)").unwrap());

/// Session occupancy ratio past which stats report `needs_cleanup`.
const HEALTH_RATIO: f64 = 0.9;

/// How many fragments `get_stats` surfaces as most-accessed.
const TOP_ACCESSED: usize = 5;

pub struct MemoryService {
    store: Arc<dyn FragmentStore>,
    extractor: Arc<dyn FragmentExtractor>,
    scorer: Arc<RelevanceScorer>,
    assembler: ContextAssembler,
    retention: RetentionManager,
    config: MemoryConfig,
}

impl MemoryService {
    pub fn new(store: Arc<dyn FragmentStore>, config: MemoryConfig) -> Self {
        Self::with_extractor(store, Arc::new(HeuristicExtractor), config)
    }

    /// Build a service with a custom extractor. The extractor feeds both
    /// fragment capture and query-side scoring, so both sides always
    /// speak the same vocabulary.
    pub fn with_extractor(
        store: Arc<dyn FragmentStore>,
        extractor: Arc<dyn FragmentExtractor>,
        config: MemoryConfig,
    ) -> Self {
        let scorer = Arc::new(RelevanceScorer::new(
            store.clone(),
            extractor.clone(),
            config.relevance_threshold,
        ));
        let assembler =
            ContextAssembler::new(store.clone(), scorer.clone(), config.retrieval_limit);
        let retention = RetentionManager::new(
            store.clone(),
            config.max_fragments,
            config.decay_days,
            config.importance_floor,
        );
        Self {
            store,
            extractor,
            scorer,
            assembler,
            retention,
            config,
        }
    }

    /// Capture one question/answer exchange as memory fragments.
    ///
    /// Besides the verbatim question and answer, both texts are scanned
    /// for stated preferences and numeric business facts, which become
    /// their own fragments linked back to the question. Returns the ids
    /// of everything stored; a storage outage yields an empty vec.
    pub async fn store_interaction(
        &self,
        session_id: &str,
        question: &str,
        answer: Option<&str>,
    ) -> Vec<String> {
        if !self.config.enabled {
            return Vec::new();
        }

        let question_fragment =
            self.build_fragment(session_id, question, ContentType::Question, vec![]);
        let question_id = question_fragment.fragment_id.clone();

        let mut fragments = vec![question_fragment];
        if let Some(answer) = answer {
            fragments.push(self.build_fragment(
                session_id,
                answer,
                ContentType::Answer,
                vec![question_id.clone()],
            ));
        }
        let scanned = [Some(question), answer];
        for text in scanned.into_iter().flatten() {
            for statement in detect_preferences(text) {
                fragments.push(self.build_fragment(
                    session_id,
                    &statement,
                    ContentType::Preference,
                    vec![question_id.clone()],
                ));
            }
            for sentence in detect_facts(text) {
                fragments.push(self.build_fragment(
                    session_id,
                    &sentence,
                    ContentType::Fact,
                    vec![question_id.clone()],
                ));
            }
        }

        let mut stored = Vec::with_capacity(fragments.len());
        for fragment in &fragments {
            match self.store.insert(fragment).await {
                Ok(()) => {
                    metrics::counter!("mnemo_fragments_stored_total").increment(1);
                    stored.push(fragment.fragment_id.clone());
                }
                Err(e) => {
                    metrics::counter!("mnemo_storage_errors_total").increment(1);
                    warn!("failed to store fragment {}: {e}", fragment.fragment_id);
                }
            }
        }

        self.retention.run(session_id).await;
        stored
    }

    /// Assemble conversation context for the next turn. Any failure
    /// degrades to an empty context.
    pub async fn get_context(&self, session_id: &str, query: &str) -> ConversationContext {
        if !self.config.enabled {
            return ConversationContext::empty(session_id);
        }
        match self.assembler.build(session_id, query).await {
            Ok(ctx) => ctx,
            Err(e) => {
                metrics::counter!("mnemo_storage_errors_total").increment(1);
                warn!("context assembly failed for session {session_id}: {e}");
                ConversationContext::empty(session_id)
            }
        }
    }

    /// Render a context as prompt text within the configured budget.
    pub fn format_context(&self, ctx: &ConversationContext) -> String {
        format_for_prompt(ctx, self.config.max_context_chars)
    }

    /// Rank a session's fragments against a query without touching
    /// access counts.
    pub async fn search(&self, session_id: &str, query: &str) -> Vec<FragmentRecord> {
        if !self.config.enabled {
            return Vec::new();
        }
        match self.store.find_by_session(session_id).await {
            Ok(fragments) => self
                .scorer
                .rank(fragments, query)
                .iter()
                .take(self.config.retrieval_limit)
                .map(|s| FragmentRecord::from(&s.fragment))
                .collect(),
            Err(e) => {
                metrics::counter!("mnemo_storage_errors_total").increment(1);
                warn!("search failed for session {session_id}: {e}");
                Vec::new()
            }
        }
    }

    /// Summarize a session's memory. Degrades to default stats on error.
    pub async fn get_stats(&self, session_id: &str) -> MemoryStats {
        if !self.config.enabled {
            return MemoryStats::default();
        }
        let fragments = match self.store.find_by_session(session_id).await {
            Ok(fragments) => fragments,
            Err(e) => {
                metrics::counter!("mnemo_storage_errors_total").increment(1);
                warn!("stats query failed for session {session_id}: {e}");
                return MemoryStats::default();
            }
        };

        let mut stats = MemoryStats {
            total: fragments.len(),
            ..MemoryStats::default()
        };
        for fragment in &fragments {
            let entry = stats
                .by_type
                .entry(fragment.content_type.as_str().to_string())
                .or_insert_with(TypeStats::default);
            entry.count += 1;
            entry.avg_importance += fragment.importance_score;
            entry.total_access += fragment.access_count;
        }
        for entry in stats.by_type.values_mut() {
            entry.avg_importance /= entry.count as f64;
        }

        let mut by_access = fragments;
        by_access.sort_by(|a, b| {
            b.access_count
                .cmp(&a.access_count)
                .then(a.fragment_id.cmp(&b.fragment_id))
        });
        stats.top_accessed = by_access
            .iter()
            .take(TOP_ACCESSED)
            .map(FragmentRecord::from)
            .collect();

        if stats.total as f64 >= HEALTH_RATIO * self.config.max_fragments as f64 {
            stats.health = "needs_cleanup".to_string();
        }
        stats
    }

    /// Delete every fragment for a session, returning how many went.
    pub async fn clear_session(&self, session_id: &str) -> usize {
        if !self.config.enabled {
            return 0;
        }
        match self.store.delete_session(session_id).await {
            Ok(removed) => removed,
            Err(e) => {
                metrics::counter!("mnemo_storage_errors_total").increment(1);
                warn!("clear failed for session {session_id}: {e}");
                0
            }
        }
    }

    fn build_fragment(
        &self,
        session_id: &str,
        content: &str,
        content_type: ContentType,
        related_fragments: Vec<String>,
    ) -> MemoryFragment {
        let now = Utc::now();
        let (keywords, entities) = self.extractor.extract(content);
        MemoryFragment {
            fragment_id: fragment_id(session_id, content_type, content, now.timestamp_micros()),
            session_id: session_id.to_string(),
            content: content.to_string(),
            content_type,
            timestamp: now,
            importance_score: score_importance(content, content_type),
            keywords,
            entities,
            related_fragments,
            access_count: 0,
            last_accessed: None,
        }
    }
}

// The digest covers content type as well, so a question and an answer
// with identical text in the same interaction still get distinct ids.
fn fragment_id(session_id: &str, content_type: ContentType, content: &str, micros: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content_type.as_str().as_bytes());
    hasher.update(content.as_bytes());
    let hex: String = hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();
    format!("mem_{session_id}_{micros}_{}", &hex[..8])
}

/// Rewrite stated preferences in a user utterance as standalone
/// statements, e.g. "i prefer bar charts" becomes "User prefers bar
/// charts".
fn detect_preferences(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut statements = Vec::new();
    for caps in STATED_PREFERENCE_RE.captures_iter(&lowered) {
        statements.push(format!("User {}s {}", &caps[1], caps[2].trim()));
    }
    for caps in HABIT_RE.captures_iter(&lowered) {
        statements.push(format!("User {} {}", &caps[1], caps[2].trim()));
    }
    for caps in FAVORITE_RE.captures_iter(&lowered) {
        statements.push(format!(
            "User's favorite {} is {}",
            caps[1].trim(),
            caps[2].trim()
        ));
    }
    statements
}

/// Pull numeric business statements out of an answer. A sentence counts
/// as a fact when it names a business term and carries a number.
fn detect_facts(text: &str) -> Vec<String> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| {
            let lowered = s.to_lowercase();
            BUSINESS_VOCAB_RE.is_match(&lowered) && s.chars().any(|c| c.is_ascii_digit())
        })
        .map(|s| format!("Fact: {s}"))
        .collect()
}
