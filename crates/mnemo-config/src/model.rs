// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Mnemo memory engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Mnemo configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemoConfig {
    /// Memory engine tuning.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Memory engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Enable the memory system. When false, no memory operations occur.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// Maximum fragments retained per session before eviction.
    #[serde(default = "default_max_fragments")]
    pub max_fragments: usize,

    /// Age in days after which low-importance fragments decay.
    #[serde(default = "default_decay_days")]
    pub decay_days: i64,

    /// Fragments at or above this importance survive decay regardless of age.
    #[serde(default = "default_importance_floor")]
    pub importance_floor: f64,

    /// Minimum relevance score for a fragment to be retrieved (0.0-1.0).
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,

    /// Maximum fragments returned per relevance query.
    #[serde(default = "default_retrieval_limit")]
    pub retrieval_limit: usize,

    /// Character budget for the rendered prompt context block.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            max_fragments: default_max_fragments(),
            decay_days: default_decay_days(),
            importance_floor: default_importance_floor(),
            relevance_threshold: default_relevance_threshold(),
            retrieval_limit: default_retrieval_limit(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

fn default_memory_enabled() -> bool {
    true
}

fn default_max_fragments() -> usize {
    1000
}

fn default_decay_days() -> i64 {
    30
}

fn default_importance_floor() -> f64 {
    0.7
}

fn default_relevance_threshold() -> f64 {
    0.3
}

fn default_retrieval_limit() -> usize {
    10
}

fn default_max_context_chars() -> usize {
    4000
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "mnemo.db".to_string()
}
