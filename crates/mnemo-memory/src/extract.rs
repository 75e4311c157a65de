// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic keyword/entity extraction and importance scoring.
//!
//! Extraction is pure, deterministic, and regex-based; no network calls.
//! A stronger extractor can be plugged in via the `FragmentExtractor`
//! trait without touching scoring or retention.

use std::sync::LazyLock;

use mnemo_core::{ContentType, FragmentExtractor};
use regex::Regex;

/// Lowercase alphabetic tokens longer than 3 characters.
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-z]{4,}\b").unwrap());

/// Common stop words excluded from keywords.
const STOP_WORDS: &[&str] = &[
    "the", "and", "but", "for", "are", "with", "this", "that", "from", "they", "have", "been",
    "was", "were", "said", "each", "which", "their", "time", "will", "about", "can", "would",
    "there", "what", "some", "had", "them", "these", "may", "like", "use", "into", "than", "more",
    "very", "when", "much", "how", "where", "why", "who",
];

/// `M/D/YYYY` dates.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}/\d{4}\b").unwrap());

/// Monetary amounts.
static MONEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\d+\.?\d*").unwrap());

/// Bare digit runs.
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+\.?\d*").unwrap());

/// Capitalized tokens (potential names and places).
static CAPITALIZED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+\b").unwrap());

/// Fixed business vocabulary. The capture group is the singular stem, so
/// "charts" and "chart" both normalize to the entity "chart".
pub(crate) static BUSINESS_VOCAB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(revenue|sales|profit|growth|customer|product|order|analytic|dashboard|report|chart|graph)s?\b",
    )
    .unwrap()
});

/// Signal words that raise importance when present in content.
static SIGNAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(prefer|like|want|need|always|never|important|remember)\b").unwrap()
});

fn push_unique(acc: &mut Vec<String>, value: &str, cap: usize) {
    if acc.len() < cap && !acc.iter().any(|v| v == value) {
        acc.push(value.to_string());
    }
}

/// Default regex-based extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicExtractor;

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FragmentExtractor for HeuristicExtractor {
    /// Keywords: lowercase alphabetic tokens of length > 3, stop-word
    /// filtered, deduplicated, capped at 10 in first-seen order.
    ///
    /// Entities: dates, monetary amounts, digit runs, capitalized tokens,
    /// and business-vocabulary stems, deduplicated, capped at 15 in
    /// first-seen order.
    fn extract(&self, text: &str) -> (Vec<String>, Vec<String>) {
        let lower = text.to_lowercase();

        let mut keywords = Vec::new();
        for m in WORD_RE.find_iter(&lower) {
            let word = m.as_str();
            if STOP_WORDS.contains(&word) {
                continue;
            }
            push_unique(&mut keywords, word, 10);
        }

        let mut entities = Vec::new();
        for m in DATE_RE.find_iter(text) {
            push_unique(&mut entities, m.as_str(), 15);
        }
        for m in MONEY_RE.find_iter(text) {
            push_unique(&mut entities, m.as_str(), 15);
        }
        for m in NUMBER_RE.find_iter(text) {
            push_unique(&mut entities, m.as_str(), 15);
        }
        for m in CAPITALIZED_RE.find_iter(text) {
            push_unique(&mut entities, m.as_str(), 15);
        }
        for cap in BUSINESS_VOCAB_RE.captures_iter(&lower) {
            push_unique(&mut entities, &cap[1], 15);
        }

        (keywords, entities)
    }
}

/// Static importance in [0, 1] for newly created content.
///
/// Base weight by content type, plus additive bonuses for length,
/// signal words (one per occurrence, uncapped before the final clamp),
/// and the presence of digits.
pub fn score_importance(content: &str, content_type: ContentType) -> f64 {
    let mut score = match content_type {
        ContentType::Preference => 0.9,
        ContentType::Fact => 0.8,
        ContentType::Answer => 0.7,
        ContentType::Question => 0.6,
        ContentType::Context => 0.4,
    };

    if content.len() > 100 {
        score += 0.1;
    }
    if content.len() > 500 {
        score += 0.1;
    }

    let lower = content.to_lowercase();
    score += 0.15 * SIGNAL_RE.find_iter(&lower).count() as f64;

    if content.chars().any(|c| c.is_ascii_digit()) {
        score += 0.1;
    }

    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_lowercase_long_tokens() {
        let (keywords, _) = HeuristicExtractor.extract("Show Revenue trends for May");
        assert!(keywords.contains(&"show".to_string()));
        assert!(keywords.contains(&"revenue".to_string()));
        assert!(keywords.contains(&"trends".to_string()));
        // "for" and "may" are too short or stop words.
        assert!(!keywords.contains(&"for".to_string()));
        assert!(!keywords.contains(&"may".to_string()));
    }

    #[test]
    fn keywords_filter_stop_words() {
        let (keywords, _) = HeuristicExtractor.extract("What would they have been doing there");
        assert!(!keywords.contains(&"what".to_string()));
        assert!(!keywords.contains(&"would".to_string()));
        assert!(!keywords.contains(&"there".to_string()));
        assert!(keywords.contains(&"doing".to_string()));
    }

    #[test]
    fn keywords_dedup_first_seen_and_cap_at_ten() {
        let text = "alpha alpha bravo charlie delta echoes foxtrot golfing hotels india juliet kilos limas";
        let (keywords, _) = HeuristicExtractor.extract(text);
        assert_eq!(keywords.len(), 10);
        assert_eq!(keywords[0], "alpha");
        assert_eq!(keywords[1], "bravo");
        // Truncation keeps first-seen order; later tokens are dropped.
        assert!(!keywords.contains(&"limas".to_string()));
    }

    #[test]
    fn entities_capture_money_dates_and_numbers() {
        let (_, entities) = HeuristicExtractor.extract("Revenue hit $1500.50 on 3/15/2026, up 12%");
        assert!(entities.contains(&"$1500.50".to_string()));
        assert!(entities.contains(&"3/15/2026".to_string()));
        assert!(entities.contains(&"12".to_string()));
    }

    #[test]
    fn entities_capture_capitalized_and_vocab_stems() {
        let (_, entities) = HeuristicExtractor.extract("Acme added customers in the sales dashboard");
        assert!(entities.contains(&"Acme".to_string()));
        assert!(entities.contains(&"customer".to_string()));
        assert!(entities.contains(&"sales".to_string()));
        assert!(entities.contains(&"dashboard".to_string()));
    }

    #[test]
    fn vocab_plural_normalizes_to_stem() {
        let (_, from_plural) = HeuristicExtractor.extract("bar charts");
        let (_, from_singular) = HeuristicExtractor.extract("a chart");
        assert!(from_plural.contains(&"chart".to_string()));
        assert!(from_singular.contains(&"chart".to_string()));
    }

    #[test]
    fn entities_cap_at_fifteen() {
        let text = (1..=20).map(|n| n.to_string()).collect::<Vec<_>>().join(" ");
        let (_, entities) = HeuristicExtractor.extract(&text);
        assert_eq!(entities.len(), 15);
        assert_eq!(entities[0], "1");
    }

    #[test]
    fn extraction_is_deterministic() {
        let text = "Acme sales hit $500 on 1/2/2026 and customers loved the dashboards";
        let first = HeuristicExtractor.extract(text);
        let second = HeuristicExtractor.extract(text);
        assert_eq!(first, second);
    }

    #[test]
    fn importance_base_weights() {
        assert_eq!(score_importance("short", ContentType::Preference), 0.9);
        assert_eq!(score_importance("short", ContentType::Fact), 0.8);
        assert_eq!(score_importance("short", ContentType::Answer), 0.7);
        assert_eq!(score_importance("short", ContentType::Question), 0.6);
        assert_eq!(score_importance("short", ContentType::Context), 0.4);
    }

    #[test]
    fn importance_length_bonuses_stack() {
        let medium = "x".repeat(150);
        let long = "x".repeat(600);
        assert!((score_importance(&medium, ContentType::Context) - 0.5).abs() < 1e-9);
        assert!((score_importance(&long, ContentType::Context) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn importance_signal_words_add_per_occurrence() {
        // context base 0.4 + two signal hits = 0.7
        let score = score_importance("always remember the budget", ContentType::Context);
        assert!((score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn importance_digit_bonus() {
        let score = score_importance("grew 10 points", ContentType::Context);
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn importance_clamps_to_one() {
        // preference base 0.9 + signal word pushes past 1.0
        let score = score_importance(
            "I prefer bar charts over pie charts",
            ContentType::Preference,
        );
        assert_eq!(score, 1.0);
    }

    #[test]
    fn importance_never_negative_or_above_one() {
        for ct in [
            ContentType::Question,
            ContentType::Answer,
            ContentType::Context,
            ContentType::Preference,
            ContentType::Fact,
        ] {
            for content in ["", "a", "always never important remember prefer like want need"] {
                let score = score_importance(content, ct);
                assert!((0.0..=1.0).contains(&score), "{ct:?}/{content}: {score}");
            }
        }
    }
}
