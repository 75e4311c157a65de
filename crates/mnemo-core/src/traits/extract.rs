// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pluggable keyword/entity extraction strategy.

/// Strategy for deriving keywords and entities from raw text.
///
/// Implementations must be pure and deterministic: no network calls,
/// identical output for identical input. A stronger NLP-backed
/// extractor can be substituted without touching scoring or retention.
pub trait FragmentExtractor: Send + Sync {
    /// Extract `(keywords, entities)` from the given text.
    ///
    /// Keywords are capped at 10 and entities at 15, deduplicated in
    /// first-seen order when truncation is needed.
    fn extract(&self, text: &str) -> (Vec<String>, Vec<String>);
}
