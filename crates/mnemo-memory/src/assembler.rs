// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembles ranked fragments into a bounded conversation context and
//! renders it as prompt text.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;
use tracing::debug;

use mnemo_core::{ContentType, FragmentStore, MnemoError};

use crate::scorer::RelevanceScorer;
use crate::types::{ConversationContext, ScoredFragment};

static PREFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(prefer|like|want|need)s?\s+([^.]+)").unwrap());

/// How many top-ranked fragments contribute entities, and how many
/// themes are reported. Theme frequency itself is counted over the
/// whole relevant set.
const SUMMARY_DEPTH: usize = 5;

/// Cap on entities surfaced in the assembled context.
const ENTITY_CAP: usize = 10;

/// Excerpt length cap when rendering fragments into a prompt.
const EXCERPT_CHARS: usize = 200;

/// Builds [`ConversationContext`] values from stored fragments.
pub struct ContextAssembler {
    store: Arc<dyn FragmentStore>,
    scorer: Arc<RelevanceScorer>,
    retrieval_limit: usize,
}

impl ContextAssembler {
    pub fn new(
        store: Arc<dyn FragmentStore>,
        scorer: Arc<RelevanceScorer>,
        retrieval_limit: usize,
    ) -> Self {
        Self {
            store,
            scorer,
            retrieval_limit,
        }
    }

    /// Assemble the context for a session against the current query.
    pub async fn build(
        &self,
        session_id: &str,
        query: &str,
    ) -> Result<ConversationContext, MnemoError> {
        let relevant = self
            .scorer
            .retrieve_relevant(session_id, query, self.retrieval_limit)
            .await?;

        let mut ctx = ConversationContext::empty(session_id);
        ctx.user_preferences = extract_preferences(&relevant);
        ctx.conversation_themes = top_themes(&relevant);
        ctx.recent_entities = recent_entities(&relevant);
        ctx.relevant_memories = relevant;

        let turns = self
            .store
            .count_by_types(session_id, &[ContentType::Question, ContentType::Answer])
            .await?;
        ctx.current_turn = turns + 1;

        debug!(
            "assembled context for session {session_id}: {} memories, turn {}",
            ctx.relevant_memories.len(),
            ctx.current_turn
        );
        Ok(ctx)
    }
}

fn extract_preferences(relevant: &[ScoredFragment]) -> BTreeMap<String, String> {
    let mut preferences = BTreeMap::new();
    for scored in relevant {
        if scored.fragment.content_type != ContentType::Preference {
            continue;
        }
        let lowered = scored.fragment.content.to_lowercase();
        for caps in PREFERENCE_RE.captures_iter(&lowered) {
            preferences.insert(caps[1].to_string(), caps[2].trim().to_string());
        }
    }
    preferences
}

/// Most frequent keywords across the whole relevant set, most common
/// first with alphabetical tie-breaks.
fn top_themes(relevant: &[ScoredFragment]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for scored in relevant {
        for keyword in &scored.fragment.keywords {
            *counts.entry(keyword).or_default() += 1;
        }
    }
    let mut themes: Vec<(&str, usize)> = counts.into_iter().collect();
    themes.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    themes
        .into_iter()
        .take(SUMMARY_DEPTH)
        .map(|(k, _)| k.to_string())
        .collect()
}

fn recent_entities(relevant: &[ScoredFragment]) -> Vec<String> {
    let mut entities = Vec::new();
    for scored in relevant.iter().take(SUMMARY_DEPTH) {
        for entity in &scored.fragment.entities {
            if entities.len() >= ENTITY_CAP {
                return entities;
            }
            if !entities.contains(entity) {
                entities.push(entity.clone());
            }
        }
    }
    entities
}

/// Render an assembled context as prompt text, staying within
/// `max_chars`. Sections with no content are omitted; every section and
/// excerpt is added best-first only while it still fits the budget
/// alongside the footer.
pub fn format_for_prompt(ctx: &ConversationContext, max_chars: usize) -> String {
    let mut out = format!("=== CONVERSATION CONTEXT (Turn {}) ===\n", ctx.current_turn);
    let footer = "=== END CONTEXT ===";

    if !ctx.user_preferences.is_empty() {
        let mut section = String::from("User preferences:\n");
        for (kind, value) in &ctx.user_preferences {
            section.push_str(&format!("- {kind}: {value}\n"));
        }
        push_if_fits(&mut out, &section, max_chars, footer.len());
    }
    if !ctx.conversation_themes.is_empty() {
        let line = format!("Themes: {}\n", ctx.conversation_themes.join(", "));
        push_if_fits(&mut out, &line, max_chars, footer.len());
    }
    if !ctx.recent_entities.is_empty() {
        let mut sorted = ctx.recent_entities.clone();
        sorted.sort();
        let line = format!("Entities: {}\n", sorted.join(", "));
        push_if_fits(&mut out, &line, max_chars, footer.len());
    }

    if !ctx.relevant_memories.is_empty()
        && push_if_fits(&mut out, "Relevant memories:\n", max_chars, footer.len())
    {
        let now = Utc::now();
        for scored in &ctx.relevant_memories {
            let line = format!(
                "[{}, {}] {}\n",
                scored.fragment.content_type.as_str().to_uppercase(),
                age_label(scored.fragment.age_days(now)),
                excerpt(&scored.fragment.content)
            );
            if !push_if_fits(&mut out, &line, max_chars, footer.len()) {
                break;
            }
        }
    }

    out.push_str(footer);
    out
}

fn push_if_fits(out: &mut String, line: &str, max_chars: usize, reserved: usize) -> bool {
    if out.len() + line.len() + reserved <= max_chars {
        out.push_str(line);
        true
    } else {
        false
    }
}

fn age_label(age_days: f64) -> String {
    if age_days >= 1.0 {
        format!("{}d ago", age_days as i64)
    } else {
        format!("{}h ago", (age_days * 24.0) as i64)
    }
}

fn excerpt(content: &str) -> String {
    if content.chars().count() <= EXCERPT_CHARS {
        content.to_string()
    } else {
        let cut: String = content.chars().take(EXCERPT_CHARS - 3).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{HeuristicExtractor, score_importance};
    use crate::scorer::DEFAULT_RELEVANCE_THRESHOLD;
    use mnemo_core::{FragmentExtractor, MemoryFragment};
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

    fn assembler(store: Arc<MockFragmentStore>) -> ContextAssembler {
        let scorer = Arc::new(RelevanceScorer::new(
            store.clone(),
            Arc::new(HeuristicExtractor),
            DEFAULT_RELEVANCE_THRESHOLD,
        ));
        ContextAssembler::new(store, scorer, 10)
    }

    #[tokio::test]
    async fn context_carries_preferences_and_themes() {
        let store = Arc::new(MockFragmentStore::new());
        store
            .insert(&make_fragment(
                "q1",
                "Show revenue dashboard for March",
                ContentType::Question,
            ))
            .await
            .unwrap();
        store
            .insert(&make_fragment(
                "p1",
                "User prefers bar charts",
                ContentType::Preference,
            ))
            .await
            .unwrap();

        let ctx = assembler(store)
            .build("s1", "revenue dashboard charts")
            .await
            .unwrap();
        assert_eq!(
            ctx.user_preferences.get("prefer").map(String::as_str),
            Some("bar charts")
        );
        assert!(!ctx.conversation_themes.is_empty());
        assert_eq!(ctx.current_turn, 2, "one stored question means turn 2");
    }

    #[tokio::test]
    async fn empty_session_yields_turn_one_context() {
        let store = Arc::new(MockFragmentStore::new());
        let ctx = assembler(store).build("s1", "anything").await.unwrap();
        assert_eq!(ctx.current_turn, 1);
        assert!(ctx.relevant_memories.is_empty());
        assert!(ctx.user_preferences.is_empty());
    }

    #[test]
    fn themes_count_keywords_across_every_relevant_fragment() {
        let mut relevant = Vec::new();
        for (i, kw) in ["alpha", "bravo", "carol", "delta", "echos"]
            .iter()
            .enumerate()
        {
            let mut fragment =
                make_fragment(&format!("top{i}"), "placeholder", ContentType::Context);
            fragment.keywords = vec![kw.to_string()];
            relevant.push(ScoredFragment {
                fragment,
                score: 10.0 - i as f64,
            });
        }
        // "budget" only appears below the top five, but five times,
        // making it the most frequent keyword overall.
        for i in 0..5 {
            let mut fragment =
                make_fragment(&format!("low{i}"), "placeholder", ContentType::Context);
            fragment.keywords = vec!["budget".to_string()];
            relevant.push(ScoredFragment {
                fragment,
                score: 1.0,
            });
        }

        let themes = top_themes(&relevant);
        assert_eq!(themes[0], "budget");
        assert_eq!(themes.len(), 5);
    }

    #[test]
    fn themes_tie_break_alphabetically() {
        let mut a = make_fragment("a", "placeholder", ContentType::Context);
        a.keywords = vec!["zebra".to_string(), "apple".to_string()];
        let relevant = vec![ScoredFragment {
            fragment: a,
            score: 1.0,
        }];
        assert_eq!(top_themes(&relevant), vec!["apple", "zebra"]);
    }

    #[test]
    fn rendering_is_deterministic_and_bounded() {
        let mut ctx = ConversationContext::empty("s1");
        ctx.current_turn = 3;
        ctx.recent_entities = vec!["beta".to_string(), "alpha".to_string()];
        for i in 0..20 {
            let fragment =
                make_fragment(&format!("f{i}"), &"x".repeat(300), ContentType::Context);
            ctx.relevant_memories.push(ScoredFragment {
                fragment,
                score: 1.0,
            });
        }

        let first = format_for_prompt(&ctx, 600);
        let second = format_for_prompt(&ctx, 600);
        assert_eq!(first, second);
        assert!(first.len() <= 600);
        assert!(first.starts_with("=== CONVERSATION CONTEXT (Turn 3) ==="));
        assert!(first.ends_with("=== END CONTEXT ==="));
        // Entities render sorted regardless of stored order.
        assert!(first.contains("Entities: alpha, beta"));
    }

    #[test]
    fn oversized_header_sections_are_skipped() {
        let mut ctx = ConversationContext::empty("s1");
        ctx.user_preferences
            .insert("prefer".to_string(), "x".repeat(300));
        ctx.conversation_themes = vec!["y".repeat(300)];

        let rendered = format_for_prompt(&ctx, 80);
        assert!(rendered.len() <= 80, "{} chars", rendered.len());
        assert!(!rendered.contains("User preferences"));
        assert!(!rendered.contains("Themes"));
        assert!(rendered.starts_with("=== CONVERSATION CONTEXT (Turn 1) ==="));
        assert!(rendered.ends_with("=== END CONTEXT ==="));
    }

    #[test]
    fn excerpts_are_capped_at_two_hundred_chars() {
        let long = "y".repeat(500);
        let rendered = excerpt(&long);
        assert_eq!(rendered.chars().count(), EXCERPT_CHARS);
        assert!(rendered.ends_with("..."));
    }
}
