//! Keyword lookup across earlier user messages.

use parley_core::types::{Message, Role};

/// Finds user messages mentioning a term and renders the result.
#[derive(Debug, Clone)]
pub struct HistorySearch {
    /// Most recent matches kept.
    pub limit: usize,
}

impl Default for HistorySearch {
    fn default() -> Self {
        Self { limit: 5 }
    }
}

impl HistorySearch {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// User messages whose lowercased text contains `term` (already
    /// lowercased), oldest first, capped to the `limit` most recent.
    pub fn find<'a>(&self, term: &str, history: &'a [Message]) -> Vec<&'a Message> {
        let hits: Vec<&Message> = history
            .iter()
            .filter(|m| m.role == Role::User && m.text.to_lowercase().contains(term))
            .collect();
        let start = hits.len().saturating_sub(self.limit);
        hits[start..].to_vec()
    }

    /// Search and format the reply text.
    pub fn reply(&self, term: &str, history: &[Message]) -> String {
        let hits = self.find(term, history);
        if hits.is_empty() {
            return format!(
                "Nothing in our chat mentions “{}.” Try saying the thing first, then ask me to find it.",
                term
            );
        }

        let noun = if hits.len() == 1 { "message" } else { "messages" };
        let bullets: Vec<String> = hits.iter().map(|m| format!("• {}", m.text)).collect();
        format!(
            "Found {} recent {} mentioning “{}”:\n{}",
            hits.len(),
            noun,
            term,
            bullets.join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<Message> {
        vec![
            Message::user("You", "I like pizza"),
            Message::assistant("AI", "Pizza is fine, I suppose."),
            Message::user("You", "pizza is great"),
            Message::user("You", "unrelated"),
        ]
    }

    #[test]
    fn test_find_only_user_messages_in_order() {
        let history = history();
        let hits = HistorySearch::default().find("pizza", &history);
        let texts: Vec<&str> = hits.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["I like pizza", "pizza is great"]);
    }

    #[test]
    fn test_find_is_case_insensitive_on_text() {
        let history = vec![Message::user("You", "PIZZA night")];
        assert_eq!(HistorySearch::default().find("pizza", &history).len(), 1);
    }

    #[test]
    fn test_find_keeps_most_recent_matches() {
        let history: Vec<Message> = (0..8)
            .map(|i| Message::user("You", &format!("note {}", i)))
            .collect();
        let hits = HistorySearch::new(5).find("note", &history);
        let texts: Vec<&str> = hits.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["note 3", "note 4", "note 5", "note 6", "note 7"]);
    }

    #[test]
    fn test_reply_plural() {
        let reply = HistorySearch::default().reply("pizza", &history());
        assert_eq!(
            reply,
            "Found 2 recent messages mentioning “pizza”:\n• I like pizza\n• pizza is great"
        );
    }

    #[test]
    fn test_reply_singular() {
        let reply = HistorySearch::default().reply("unrelated", &history());
        assert!(reply.starts_with("Found 1 recent message mentioning"));
        assert!(reply.ends_with("\n• unrelated"));
    }

    #[test]
    fn test_reply_no_hits() {
        let reply = HistorySearch::default().reply("sushi", &history());
        assert!(reply.starts_with("Nothing in our chat mentions “sushi.”"));
        assert!(!reply.contains('•'));
    }
}
