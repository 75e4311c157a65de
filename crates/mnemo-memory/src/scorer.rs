// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relevance scoring and ranked retrieval.
//!
//! The score combines static importance, keyword/entity overlap with the
//! query, access frequency, and fragment age:
//!
//! ```text
//! score = importance
//!       + 0.3 * |keywords ∩ query_keywords|
//!       + 0.4 * |entities ∩ query_entities|
//!       + 0.1 * ln(1 + access_count)    (when access_count > 0)
//!       + 0.2 * age_in_days
//! ```
//!
//! Note the age term rewards OLDER fragments, not newer ones. That is
//! the shipped behavior and is preserved literally; see DESIGN.md
//! before changing it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use mnemo_core::{FragmentExtractor, FragmentStore, MemoryFragment, MnemoError};

use crate::types::ScoredFragment;

/// Minimum score for a fragment to be considered relevant.
pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 0.3;

/// Default cap on fragments returned per query.
pub const DEFAULT_RETRIEVAL_LIMIT: usize = 10;

/// Score one fragment against pre-extracted query keywords/entities.
///
/// Fails only when the arithmetic produces a non-finite value (a
/// corrupt importance score, for instance); callers exclude that
/// fragment and continue.
pub fn relevance_score(
    fragment: &MemoryFragment,
    query_keywords: &[String],
    query_entities: &[String],
    now: DateTime<Utc>,
) -> Result<f64, MnemoError> {
    let keyword_overlap = fragment
        .keywords
        .iter()
        .filter(|k| query_keywords.contains(k))
        .count() as f64;
    let entity_overlap = fragment
        .entities
        .iter()
        .filter(|e| query_entities.contains(e))
        .count() as f64;

    let mut score = fragment.importance_score + 0.3 * keyword_overlap + 0.4 * entity_overlap;
    if fragment.access_count > 0 {
        score += 0.1 * (1.0 + fragment.access_count as f64).ln();
    }
    score += 0.2 * fragment.age_days(now);

    if score.is_finite() {
        Ok(score)
    } else {
        Err(MnemoError::Scoring(format!(
            "non-finite relevance score for fragment {}",
            fragment.fragment_id
        )))
    }
}

/// Ranks stored fragments against incoming queries.
pub struct RelevanceScorer {
    store: Arc<dyn FragmentStore>,
    extractor: Arc<dyn FragmentExtractor>,
    threshold: f64,
}

impl RelevanceScorer {
    pub fn new(
        store: Arc<dyn FragmentStore>,
        extractor: Arc<dyn FragmentExtractor>,
        threshold: f64,
    ) -> Self {
        Self {
            store,
            extractor,
            threshold,
        }
    }

    /// Rank the given fragments against a query, best first.
    ///
    /// Fragments scoring below the relevance threshold are dropped;
    /// fragments that fail to score are logged and skipped. Ties break
    /// on recency then id so the ordering is total and deterministic.
    pub fn rank(&self, fragments: Vec<MemoryFragment>, query: &str) -> Vec<ScoredFragment> {
        let (query_keywords, query_entities) = self.extractor.extract(query);
        let now = Utc::now();

        let mut scored: Vec<ScoredFragment> = fragments
            .into_iter()
            .filter_map(|fragment| {
                match relevance_score(&fragment, &query_keywords, &query_entities, now) {
                    Ok(score) if score >= self.threshold => {
                        Some(ScoredFragment { fragment, score })
                    }
                    Ok(_) => None,
                    Err(e) => {
                        warn!("excluding fragment from ranking: {e}");
                        None
                    }
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.fragment.timestamp.cmp(&a.fragment.timestamp))
                .then(a.fragment.fragment_id.cmp(&b.fragment.fragment_id))
        });
        scored
    }

    /// Fetch a session's fragments, rank them against `query`, and return
    /// at most `limit` results.
    ///
    /// Each returned fragment gets a best-effort access-count increment;
    /// a lost increment under a race is acceptable (access counts are
    /// advisory, never used for correctness).
    pub async fn retrieve_relevant(
        &self,
        session_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ScoredFragment>, MnemoError> {
        let fragments = self.store.find_by_session(session_id).await?;
        let mut ranked = self.rank(fragments, query);
        ranked.truncate(limit);

        for scored in &mut ranked {
            if let Err(e) = self
                .store
                .increment_access(&scored.fragment.fragment_id)
                .await
            {
                debug!(
                    "access-count update failed for {}: {e}",
                    scored.fragment.fragment_id
                );
            } else {
                // Mirror the store-side increment so callers see fresh counts.
                scored.fragment.access_count += 1;
                scored.fragment.last_accessed = Some(Utc::now());
            }
        }

        debug!(
            "retrieved {} relevant fragments for session {session_id}",
            ranked.len()
        );
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{HeuristicExtractor, score_importance};
    use mnemo_core::ContentType;
    use mnemo_test_utils::MockFragmentStore;

    fn make_fragment(id: &str, content: &str, content_type: ContentType) -> MemoryFragment {
        let (keywords, entities) = HeuristicExtractor.extract(content);
        MemoryFragment {
            fragment_id: id.to_string(),
            session_id: "s1".to_string(),
            content: content.to_string(),
            content_type,
            timestamp: Utc::now(),
            importance_score: score_importance(content, content_type),
            keywords,
            entities,
            related_fragments: vec![],
            access_count: 0,
            last_accessed: None,
        }
    }

    fn scorer_over(store: Arc<MockFragmentStore>) -> RelevanceScorer {
        RelevanceScorer::new(
            store,
            Arc::new(HeuristicExtractor),
            DEFAULT_RELEVANCE_THRESHOLD,
        )
    }

    #[test]
    fn score_is_importance_plus_overlaps() {
        let now = Utc::now();
        let mut fragment = make_fragment("f1", "plain filler text", ContentType::Context);
        fragment.importance_score = 0.4;
        fragment.keywords = vec!["revenue".to_string(), "trend".to_string()];
        fragment.entities = vec!["chart".to_string()];
        fragment.timestamp = now;

        let score = relevance_score(
            &fragment,
            &["revenue".to_string()],
            &["chart".to_string()],
            now,
        )
        .unwrap();
        // 0.4 + 0.3 * 1 + 0.4 * 1, zero age, zero access
        assert!((score - 1.1).abs() < 1e-9);
    }

    #[test]
    fn access_term_is_logarithmic_and_gated() {
        let now = Utc::now();
        let mut fragment = make_fragment("f1", "plain filler text", ContentType::Context);
        fragment.timestamp = now;
        fragment.importance_score = 0.5;

        fragment.access_count = 0;
        let untouched = relevance_score(&fragment, &[], &[], now).unwrap();
        assert!((untouched - 0.5).abs() < 1e-9);

        fragment.access_count = 4;
        let touched = relevance_score(&fragment, &[], &[], now).unwrap();
        assert!((touched - (0.5 + 0.1 * 5.0_f64.ln())).abs() < 1e-9);
    }

    #[test]
    fn age_term_rewards_older_fragments() {
        let now = Utc::now();
        let mut old = make_fragment("old", "plain filler text", ContentType::Context);
        old.importance_score = 0.5;
        old.timestamp = now - chrono::Duration::days(10);
        let mut fresh = make_fragment("fresh", "plain filler text", ContentType::Context);
        fresh.importance_score = 0.5;
        fresh.timestamp = now;

        let old_score = relevance_score(&old, &[], &[], now).unwrap();
        let fresh_score = relevance_score(&fresh, &[], &[], now).unwrap();
        assert!(
            old_score > fresh_score,
            "the age term deliberately favors older fragments"
        );
        assert!((old_score - (0.5 + 0.2 * 10.0)).abs() < 1e-3);
    }

    #[test]
    fn non_finite_importance_is_a_scoring_error() {
        let now = Utc::now();
        let mut fragment = make_fragment("f1", "text", ContentType::Context);
        fragment.importance_score = f64::NAN;
        assert!(relevance_score(&fragment, &[], &[], now).is_err());
    }

    #[tokio::test]
    async fn fragment_self_matches_its_own_content() {
        let store = Arc::new(MockFragmentStore::new());
        let fragment = make_fragment(
            "f1",
            "Show monthly revenue trends for Acme",
            ContentType::Question,
        );
        store.insert(&fragment).await.unwrap();

        let scorer = scorer_over(store);
        let results = scorer
            .retrieve_relevant("s1", "Show monthly revenue trends for Acme", 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 1, "a fragment must match a query built from its own content");
        assert!(results[0].score >= DEFAULT_RELEVANCE_THRESHOLD);
    }

    #[tokio::test]
    async fn below_threshold_fragments_are_dropped() {
        let store = Arc::new(MockFragmentStore::new());
        let mut fragment = make_fragment("f1", "unrelated musings", ContentType::Context);
        fragment.importance_score = 0.1;
        fragment.keywords = vec![];
        fragment.entities = vec![];
        store.insert(&fragment).await.unwrap();

        let scorer = scorer_over(store);
        let results = scorer
            .retrieve_relevant("s1", "quarterly revenue", 10)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn limit_truncates_ranked_results() {
        let store = Arc::new(MockFragmentStore::new());
        for i in 0..8 {
            let fragment = make_fragment(
                &format!("f{i}"),
                "revenue report for the quarter",
                ContentType::Fact,
            );
            store.insert(&fragment).await.unwrap();
        }

        let scorer = scorer_over(store);
        let results = scorer
            .retrieve_relevant("s1", "revenue report", 3)
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn retrieval_increments_access_counts() {
        let store = Arc::new(MockFragmentStore::new());
        let fragment = make_fragment("f1", "revenue report highlights", ContentType::Fact);
        store.insert(&fragment).await.unwrap();

        let scorer = scorer_over(store.clone());
        let first = scorer
            .retrieve_relevant("s1", "revenue report", 10)
            .await
            .unwrap();
        assert_eq!(first[0].fragment.access_count, 1);

        let second = scorer
            .retrieve_relevant("s1", "revenue report", 10)
            .await
            .unwrap();
        assert_eq!(second[0].fragment.access_count, 2);
        assert!(second[0].fragment.last_accessed.is_some());
    }

    #[tokio::test]
    async fn preference_outranks_fact_for_chart_query() {
        let store = Arc::new(MockFragmentStore::new());
        let preference = make_fragment(
            "pref",
            "I prefer bar charts over pie charts",
            ContentType::Preference,
        );
        let fact = make_fragment("fact", "Sales grew 10% this month", ContentType::Fact);
        assert_eq!(preference.importance_score, 1.0);
        store.insert(&preference).await.unwrap();
        store.insert(&fact).await.unwrap();

        let scorer = scorer_over(store);
        let results = scorer
            .retrieve_relevant("s1", "What chart type should I use?", 10)
            .await
            .unwrap();
        assert_eq!(results[0].fragment.fragment_id, "pref");
        assert!(results[0].score > results[1].score);
    }
}
