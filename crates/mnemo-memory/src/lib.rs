// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session conversational memory.
//!
//! Interactions are captured as scored memory fragments, ranked for
//! relevance against later queries, and assembled into a bounded
//! context block suitable for prompt injection. Retention keeps each
//! session under a fragment cap and decays stale low-importance
//! fragments.
//!
//! Most callers only need [`MemoryService`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use mnemo_config::{MemoryConfig, StorageConfig};
//! use mnemo_memory::MemoryService;
//! use mnemo_storage::SqliteFragmentStore;
//!
//! # async fn demo() -> Result<(), mnemo_core::MnemoError> {
//! let store = Arc::new(SqliteFragmentStore::from_config(&StorageConfig::default()).await?);
//! let memory = MemoryService::new(store, MemoryConfig::default());
//!
//! memory
//!     .store_interaction("session-1", "I prefer bar charts", Some("Noted."))
//!     .await;
//! let ctx = memory.get_context("session-1", "what chart should I use?").await;
//! println!("{}", memory.format_context(&ctx));
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod extract;
pub mod retention;
pub mod scorer;
pub mod service;
pub mod types;

pub use assembler::{ContextAssembler, format_for_prompt};
pub use extract::{HeuristicExtractor, score_importance};
pub use retention::{
    DEFAULT_DECAY_DAYS, DEFAULT_IMPORTANCE_FLOOR, DEFAULT_MAX_FRAGMENTS, RetentionManager,
};
pub use scorer::{
    DEFAULT_RELEVANCE_THRESHOLD, DEFAULT_RETRIEVAL_LIMIT, RelevanceScorer, relevance_score,
};
pub use service::MemoryService;
pub use types::{ConversationContext, FragmentRecord, MemoryStats, ScoredFragment, TypeStats};
