//! Conversation context extraction
//!
//! Shared by all three generators: pull the most recent turns from a
//! conversation history, join them into a bounded snippet, and degrade to a
//! fixed placeholder when the history is empty or faulting. A context fetch
//! never fails the caller.

use crate::logging;
use serde::{Deserialize, Serialize};
use std::error::Error;

/// Number of recent turns included in the context snippet
pub const CONTEXT_WINDOW: usize = 5;

/// Default cap on the snippet length, in characters
pub const DEFAULT_MAX_CONTEXT_LENGTH: usize = 500;

/// Placeholder returned when no usable context exists
pub const NO_CONTEXT_PLACEHOLDER: &str = "No specific context available";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConversationTurn {
    pub role: String,
    pub content: String,
}

/// Read access to an ordered conversation history.
///
/// Implementations return at most `limit` of the most recent turns, in
/// chronological order (oldest first). Faults are allowed; the extractor
/// recovers from them.
pub trait ConversationHistory: Send + Sync {
    fn recent_turns(
        &self,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, Box<dyn Error + Send + Sync>>;
}

/// Extract a bounded context snippet from the last [`CONTEXT_WINDOW`] turns.
///
/// Turn contents are joined with single spaces in chronological order, then
/// hard-cut at `max_context_length` characters (no ellipsis, no word-boundary
/// awareness). Any fault while reading the history, or an empty history,
/// yields [`NO_CONTEXT_PLACEHOLDER`].
pub fn extract_context(
    history: &dyn ConversationHistory,
    max_context_length: usize,
) -> String {
    let turns = match history.recent_turns(CONTEXT_WINDOW) {
        Ok(turns) => turns,
        Err(e) => {
            logging::log_context(None, &format!("History read failed, using placeholder: {}", e));
            return NO_CONTEXT_PLACEHOLDER.to_string();
        }
    };

    if turns.is_empty() {
        return NO_CONTEXT_PLACEHOLDER.to_string();
    }

    let joined = turns
        .iter()
        .map(|t| t.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    // Character cut, not byte cut - a multibyte turn must not split a codepoint
    joined.chars().take(max_context_length).collect()
}

/// Simple in-memory conversation history, mainly for callers that track
/// turns themselves (and for tests).
#[derive(Debug, Default, Clone)]
pub struct InMemoryHistory {
    turns: Vec<ConversationTurn>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: &str, content: &str) {
        self.turns.push(ConversationTurn {
            role: role.to_string(),
            content: content.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl ConversationHistory for InMemoryHistory {
    fn recent_turns(
        &self,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, Box<dyn Error + Send + Sync>> {
        let start = self.turns.len().saturating_sub(limit);
        Ok(self.turns[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingHistory;

    impl ConversationHistory for FailingHistory {
        fn recent_turns(
            &self,
            _limit: usize,
        ) -> Result<Vec<ConversationTurn>, Box<dyn Error + Send + Sync>> {
            Err("connection lost".into())
        }
    }

    #[test]
    fn test_empty_history_yields_placeholder() {
        let history = InMemoryHistory::new();

        assert_eq!(
            extract_context(&history, DEFAULT_MAX_CONTEXT_LENGTH),
            NO_CONTEXT_PLACEHOLDER
        );
    }

    #[test]
    fn test_failing_history_yields_placeholder() {
        assert_eq!(
            extract_context(&FailingHistory, DEFAULT_MAX_CONTEXT_LENGTH),
            NO_CONTEXT_PLACEHOLDER
        );
    }

    #[test]
    fn test_few_turns_included_in_order() {
        let mut history = InMemoryHistory::new();
        history.push("user", "first");
        history.push("assistant", "second");
        history.push("user", "third");

        assert_eq!(
            extract_context(&history, DEFAULT_MAX_CONTEXT_LENGTH),
            "first second third"
        );
    }

    #[test]
    fn test_only_last_five_turns_used() {
        let mut history = InMemoryHistory::new();
        for i in 1..=7 {
            history.push("user", &format!("turn{}", i));
        }

        assert_eq!(
            extract_context(&history, DEFAULT_MAX_CONTEXT_LENGTH),
            "turn3 turn4 turn5 turn6 turn7"
        );
    }

    #[test]
    fn test_hard_character_cut() {
        let mut history = InMemoryHistory::new();
        history.push("user", "abcdefghij");

        assert_eq!(extract_context(&history, 4), "abcd");
    }

    #[test]
    fn test_cut_counts_characters_not_bytes() {
        let mut history = InMemoryHistory::new();
        history.push("user", "héllo wörld");

        let snippet = extract_context(&history, 6);

        assert_eq!(snippet, "héllo ");
        assert_eq!(snippet.chars().count(), 6);
    }

    #[test]
    fn test_snippet_never_exceeds_max_length() {
        let mut history = InMemoryHistory::new();
        for _ in 0..5 {
            history.push("user", &"x".repeat(300));
        }

        let snippet = extract_context(&history, DEFAULT_MAX_CONTEXT_LENGTH);

        assert_eq!(snippet.chars().count(), DEFAULT_MAX_CONTEXT_LENGTH);
    }
}
