// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock fragment store for deterministic testing.
//!
//! `MockFragmentStore` implements `FragmentStore` against an in-memory
//! Vec, enabling fast, CI-runnable tests without SQLite. An outage can
//! be injected to exercise the facade's degradation paths.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use mnemo_core::{ContentType, FragmentStore, MemoryFragment, MnemoError};

/// An in-memory fragment store with failure injection.
#[derive(Default)]
pub struct MockFragmentStore {
    fragments: Mutex<Vec<MemoryFragment>>,
    unavailable: AtomicBool,
}

impl MockFragmentStore {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the injected outage. While set, every operation fails
    /// with a storage error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of everything currently stored, across all sessions.
    pub async fn all(&self) -> Vec<MemoryFragment> {
        self.fragments.lock().await.clone()
    }

    fn check_available(&self) -> Result<(), MnemoError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MnemoError::Storage {
                source: "injected storage outage".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl FragmentStore for MockFragmentStore {
    async fn insert(&self, fragment: &MemoryFragment) -> Result<(), MnemoError> {
        self.check_available()?;
        let mut fragments = self.fragments.lock().await;
        if fragments
            .iter()
            .any(|f| f.fragment_id == fragment.fragment_id)
        {
            return Err(MnemoError::Storage {
                source: format!("duplicate fragment_id {}", fragment.fragment_id).into(),
            });
        }
        fragments.push(fragment.clone());
        Ok(())
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Vec<MemoryFragment>, MnemoError> {
        self.check_available()?;
        Ok(self
            .fragments
            .lock()
            .await
            .iter()
            .filter(|f| f.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn increment_access(&self, fragment_id: &str) -> Result<(), MnemoError> {
        self.check_available()?;
        let mut fragments = self.fragments.lock().await;
        if let Some(f) = fragments.iter_mut().find(|f| f.fragment_id == fragment_id) {
            f.access_count += 1;
            f.last_accessed = Some(Utc::now());
        }
        Ok(())
    }

    async fn delete_many(&self, fragment_ids: &[String]) -> Result<usize, MnemoError> {
        self.check_available()?;
        let mut fragments = self.fragments.lock().await;
        let before = fragments.len();
        fragments.retain(|f| !fragment_ids.contains(&f.fragment_id));
        Ok(before - fragments.len())
    }

    async fn delete_session(&self, session_id: &str) -> Result<usize, MnemoError> {
        self.check_available()?;
        let mut fragments = self.fragments.lock().await;
        let before = fragments.len();
        fragments.retain(|f| f.session_id != session_id);
        Ok(before - fragments.len())
    }

    async fn count(&self, session_id: &str) -> Result<usize, MnemoError> {
        self.check_available()?;
        Ok(self
            .fragments
            .lock()
            .await
            .iter()
            .filter(|f| f.session_id == session_id)
            .count())
    }

    async fn count_by_types(
        &self,
        session_id: &str,
        content_types: &[ContentType],
    ) -> Result<usize, MnemoError> {
        self.check_available()?;
        Ok(self
            .fragments
            .lock()
            .await
            .iter()
            .filter(|f| f.session_id == session_id && content_types.contains(&f.content_type))
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_fragment(id: &str, session: &str) -> MemoryFragment {
        MemoryFragment {
            fragment_id: id.to_string(),
            session_id: session.to_string(),
            content: "test".to_string(),
            content_type: ContentType::Fact,
            timestamp: Utc::now(),
            importance_score: 0.8,
            keywords: vec![],
            entities: vec![],
            related_fragments: vec![],
            access_count: 0,
            last_accessed: None,
        }
    }

    #[tokio::test]
    async fn insert_and_find() {
        let store = MockFragmentStore::new();
        store.insert(&make_fragment("f1", "s1")).await.unwrap();
        assert_eq!(store.find_by_session("s1").await.unwrap().len(), 1);
        assert!(store.find_by_session("s2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_insert_fails() {
        let store = MockFragmentStore::new();
        store.insert(&make_fragment("f1", "s1")).await.unwrap();
        assert!(store.insert(&make_fragment("f1", "s1")).await.is_err());
    }

    #[tokio::test]
    async fn injected_outage_fails_every_operation() {
        let store = MockFragmentStore::new();
        store.insert(&make_fragment("f1", "s1")).await.unwrap();
        store.set_unavailable(true);

        assert!(store.insert(&make_fragment("f2", "s1")).await.is_err());
        assert!(store.find_by_session("s1").await.is_err());
        assert!(store.count("s1").await.is_err());
        assert!(store.increment_access("f1").await.is_err());

        store.set_unavailable(false);
        assert_eq!(store.count("s1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn increment_updates_access_fields() {
        let store = MockFragmentStore::new();
        store.insert(&make_fragment("f1", "s1")).await.unwrap();
        store.increment_access("f1").await.unwrap();
        store.increment_access("f1").await.unwrap();

        let all = store.all().await;
        assert_eq!(all[0].access_count, 2);
        assert!(all[0].last_accessed.is_some());
    }
}
