//! Deterministic keyword-line extraction.
//!
//! Used whenever no LLM is configured or the LLM call fails. Both the agent
//! and any other analysis entry point call `extract_action_items` so the
//! fallback output cannot drift between call sites.

use crate::traits::extraction::Provider;
use crate::types::action_item::{ExtractedActionItem, Priority};
use crate::Error;
use async_trait::async_trait;

pub const KEYWORDS: [&str; 7] = [
    "action",
    "todo",
    "task",
    "follow up",
    "next steps",
    "deadline",
    "need to",
];

pub const PROVIDER_ID: &str = "keyword";
pub const MAX_ITEMS: usize = 5;
pub const MAX_TITLE_CHARS: usize = 100;

/// Returns at most five items, one per transcript line that mentions a keyword.
///
/// Matching is a case-insensitive substring test on each trimmed, non-empty
/// line. The first item is `High` priority and the rest `Medium`; lines over
/// 100 characters are truncated in the title and kept whole in the description.
pub fn extract_action_items(transcript: &str) -> Vec<ExtractedActionItem> {
    transcript
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let lowered = line.to_lowercase();
            KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
        })
        .take(MAX_ITEMS)
        .enumerate()
        .map(|(index, line)| to_item(index, line))
        .collect()
}

fn to_item(index: usize, line: &str) -> ExtractedActionItem {
    let truncated = line.chars().count() > MAX_TITLE_CHARS;
    ExtractedActionItem {
        title: line.chars().take(MAX_TITLE_CHARS).collect(),
        description: truncated.then(|| line.to_string()),
        assignee: None,
        due_date: None,
        priority: if index == 0 {
            Priority::High
        } else {
            Priority::Medium
        },
        scope_creep_flag: false,
    }
}

/// `Provider` wrapper around `extract_action_items`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

#[async_trait]
impl Provider for KeywordExtractor {
    async fn extract_action_items(
        &self,
        transcript: &str,
    ) -> std::result::Result<Vec<ExtractedActionItem>, Error> {
        Ok(extract_action_items(transcript))
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_matching_line_becomes_high_priority_item() {
        let transcript =
            "We need to follow up with legal by Friday. Action: send contract draft.";

        let items = extract_action_items(transcript);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, transcript);
        assert_eq!(items[0].description, None);
        assert_eq!(items[0].priority, Priority::High);
        assert!(!items[0].scope_creep_flag);
    }

    #[test]
    fn caps_at_five_and_marks_rest_medium() {
        let transcript = (0..8)
            .map(|i| format!("TODO item {i}"))
            .collect::<Vec<_>>()
            .join("\n");

        let items = extract_action_items(&transcript);

        assert_eq!(items.len(), MAX_ITEMS);
        assert_eq!(items[0].priority, Priority::High);
        assert!(items[1..].iter().all(|i| i.priority == Priority::Medium));
        assert_eq!(items[4].title, "TODO item 4");
    }

    #[test]
    fn skips_lines_without_keywords_and_blank_lines() {
        let transcript = "Hello everyone\n\n   \nNext Steps: ship it\nThanks all";

        let items = extract_action_items(transcript);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Next Steps: ship it");
    }

    #[test]
    fn long_lines_are_truncated_in_title_only() {
        let line = format!("Deadline {}", "x".repeat(150));

        let items = extract_action_items(&line);

        assert_eq!(items[0].title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(items[0].description.as_deref(), Some(line.as_str()));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let line = format!("task {}", "é".repeat(120));

        let items = extract_action_items(&line);

        assert_eq!(items[0].title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn is_deterministic() {
        let transcript = "action one\nnothing\nneed to do two\ntask three";

        assert_eq!(
            extract_action_items(transcript),
            extract_action_items(transcript)
        );
    }

    #[tokio::test]
    async fn keyword_extractor_provider_delegates() {
        let items = KeywordExtractor
            .extract_action_items("follow up with finance")
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(KeywordExtractor.provider_id(), "keyword");
    }
}
