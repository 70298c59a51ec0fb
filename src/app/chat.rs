use tracing::warn;

use crate::app::tasks::{OperationKind, TaskGuard, Ticket};
use crate::error::Result;
use crate::interfaces::assistant::{GroundedAnswer, GroundingSource};

/// Shown in place of an answer when the grounded search fails.
pub const SEARCH_FAILED_TEXT: &str = "Syncing with live data failed.";
/// Closes the turn of a search abandoned by leaving the panel.
pub const SEARCH_CANCELLED_TEXT: &str = "Search cancelled.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub sources: Vec<GroundingSource>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            sources: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<GroundingSource>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            sources,
        }
    }
}

/// The search-chat panel: an append-only transcript plus the composer.
#[derive(Debug, Clone)]
pub struct SearchChat {
    history: Vec<ChatMessage>,
    query: String,
    in_flight: Option<String>,
    guard: TaskGuard,
}

impl Default for SearchChat {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            query: String::new(),
            in_flight: None,
            guard: TaskGuard::new(OperationKind::Search),
        }
    }
}

impl SearchChat {
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: String) {
        self.query = query;
    }

    pub fn is_searching(&self) -> bool {
        self.guard.is_busy()
    }

    /// Moves the composer text into the transcript and returns what to send.
    /// Blank input, or a search already running, starts nothing.
    pub fn submit(&mut self) -> Option<(Ticket, String)> {
        let query = self.query.trim().to_string();
        if query.is_empty() {
            return None;
        }
        let ticket = self.guard.begin()?;
        self.history.push(ChatMessage::user(query.clone()));
        self.query.clear();
        self.in_flight = Some(query.clone());
        Some((ticket, query))
    }

    pub fn complete(&mut self, ticket: Ticket, result: Result<GroundedAnswer>) -> bool {
        if !self.guard.finish(ticket) {
            return false;
        }
        self.in_flight = None;
        let message = match result {
            Ok(answer) => ChatMessage::assistant(answer.text, answer.sources),
            Err(err) => {
                warn!(error = %err, "grounded search failed");
                ChatMessage::assistant(SEARCH_FAILED_TEXT, Vec::new())
            }
        };
        self.history.push(message);
        true
    }

    /// Abandons the running search. The user's turn gets a short closing
    /// reply and the question goes back into an empty composer.
    pub fn cancel(&mut self) -> Option<Ticket> {
        let ticket = self.guard.cancel()?;
        self.history
            .push(ChatMessage::assistant(SEARCH_CANCELLED_TEXT, Vec::new()));
        if let Some(query) = self.in_flight.take() {
            if self.query.trim().is_empty() {
                self.query = query;
            }
        }
        Some(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn blank_query_starts_nothing() {
        let mut chat = SearchChat::default();
        chat.set_query("   ".to_string());
        assert!(chat.submit().is_none());
        assert!(chat.history().is_empty());
    }

    #[test]
    fn submit_appends_user_turn_and_clears_composer() {
        let mut chat = SearchChat::default();
        chat.set_query("  G20 summit 2026 host  ".to_string());
        let (_ticket, query) = chat.submit().unwrap();
        assert_eq!(query, "G20 summit 2026 host");
        assert_eq!(chat.query(), "");
        assert_eq!(chat.history(), &[ChatMessage::user("G20 summit 2026 host")]);
        assert!(chat.is_searching());

        chat.set_query("second".to_string());
        assert!(chat.submit().is_none());
        assert_eq!(chat.history().len(), 1);
    }

    #[test]
    fn failure_appends_exactly_one_fallback_turn() {
        let mut chat = SearchChat::default();
        chat.set_query("query".to_string());
        let (ticket, _) = chat.submit().unwrap();
        assert!(chat.complete(ticket, Err(AppError::Http("boom".to_string()))));

        assert_eq!(chat.history().len(), 2);
        let last = &chat.history()[1];
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.content, SEARCH_FAILED_TEXT);
        assert!(last.sources.is_empty());
        assert!(!chat.is_searching());
    }

    #[test]
    fn cancelled_search_result_is_dropped() {
        let mut chat = SearchChat::default();
        chat.set_query("query".to_string());
        let (ticket, _) = chat.submit().unwrap();
        assert_eq!(chat.cancel(), Some(ticket));
        assert!(!chat.is_searching());

        let answer = GroundedAnswer {
            text: "late".to_string(),
            sources: Vec::new(),
        };
        assert!(!chat.complete(ticket, Ok(answer)));
        assert_eq!(chat.history().len(), 2);
        assert_eq!(chat.history()[1].content, SEARCH_CANCELLED_TEXT);
    }

    #[test]
    fn cancel_returns_question_to_empty_composer() {
        let mut chat = SearchChat::default();
        chat.set_query("Repo rate October 2026".to_string());
        chat.submit().unwrap();
        chat.cancel().unwrap();
        assert_eq!(chat.query(), "Repo rate October 2026");

        let (_ticket, _) = chat.submit().unwrap();
        chat.set_query("draft in progress".to_string());
        chat.cancel().unwrap();
        assert_eq!(chat.query(), "draft in progress");
    }

    #[test]
    fn cancel_when_idle_changes_nothing() {
        let mut chat = SearchChat::default();
        assert_eq!(chat.cancel(), None);
        assert!(chat.history().is_empty());
        assert_eq!(chat.query(), "");
    }
}
