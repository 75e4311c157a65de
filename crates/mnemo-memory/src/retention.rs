// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capacity and age-based retention for stored fragments.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use mnemo_core::{FragmentStore, MemoryFragment, MnemoError};

/// Default per-session fragment cap.
pub const DEFAULT_MAX_FRAGMENTS: usize = 1000;

/// Default age, in days, past which low-importance fragments decay.
pub const DEFAULT_DECAY_DAYS: i64 = 30;

/// Fragments at or above this importance never decay by age.
pub const DEFAULT_IMPORTANCE_FLOOR: f64 = 0.7;

/// Enforces the per-session capacity cap and the age-decay policy.
///
/// Retention runs after every stored interaction and never fails the
/// caller: a sweep that errors is logged and retried implicitly on the
/// next interaction.
pub struct RetentionManager {
    store: Arc<dyn FragmentStore>,
    max_fragments: usize,
    decay_days: i64,
    importance_floor: f64,
}

impl RetentionManager {
    pub fn new(
        store: Arc<dyn FragmentStore>,
        max_fragments: usize,
        decay_days: i64,
        importance_floor: f64,
    ) -> Self {
        Self {
            store,
            max_fragments,
            decay_days,
            importance_floor,
        }
    }

    /// Evict the lowest-value fragments until the session is back at its
    /// cap. Victims are chosen by lowest importance, oldest first.
    pub async fn enforce_capacity(&self, session_id: &str) -> Result<usize, MnemoError> {
        let total = self.store.count(session_id).await?;
        if total <= self.max_fragments {
            return Ok(0);
        }
        let overshoot = total - self.max_fragments;

        let mut fragments = self.store.find_by_session(session_id).await?;
        fragments.sort_by(|a, b| {
            a.importance_score
                .partial_cmp(&b.importance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.timestamp.cmp(&b.timestamp))
                .then(a.fragment_id.cmp(&b.fragment_id))
        });

        let victims: Vec<String> = fragments
            .iter()
            .take(overshoot)
            .map(|f| f.fragment_id.clone())
            .collect();
        let evicted = self.store.delete_many(&victims).await?;
        metrics::counter!("mnemo_fragments_evicted_total").increment(evicted as u64);
        debug!("evicted {evicted} fragments from session {session_id} (capacity)");
        Ok(evicted)
    }

    /// Delete fragments older than the decay window whose importance sits
    /// below the floor. High-importance fragments are immune regardless
    /// of age.
    pub async fn decay_sweep(&self, session_id: &str) -> Result<usize, MnemoError> {
        let fragments = self.store.find_by_session(session_id).await?;
        let now = Utc::now();
        let victims: Vec<String> = fragments
            .iter()
            .filter(|f| self.is_decayed(f, now))
            .map(|f| f.fragment_id.clone())
            .collect();
        if victims.is_empty() {
            return Ok(0);
        }
        let removed = self.store.delete_many(&victims).await?;
        metrics::counter!("mnemo_fragments_evicted_total").increment(removed as u64);
        debug!("decayed {removed} fragments from session {session_id}");
        Ok(removed)
    }

    fn is_decayed(&self, fragment: &MemoryFragment, now: chrono::DateTime<Utc>) -> bool {
        fragment.age_days(now) > self.decay_days as f64
            && fragment.importance_score < self.importance_floor
    }

    /// Run both retention policies for a session, logging rather than
    /// propagating failures.
    pub async fn run(&self, session_id: &str) {
        if let Err(e) = self.enforce_capacity(session_id).await {
            warn!("capacity enforcement failed for session {session_id}: {e}");
        }
        if let Err(e) = self.decay_sweep(session_id).await {
            warn!("decay sweep failed for session {session_id}: {e}");
        }
    }
}
