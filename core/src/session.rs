use dashmap::DashMap;

use crate::types::ChatMessage;

/// Keep only the most recent records per session to bound prompt size.
pub const MAX_HISTORY_MESSAGES: usize = 20;

/// In-memory chat history per session.
///
/// Owned and serialized by the calling pipeline: exchanges are appended only
/// after a request's final disposition is known. The guard engine never
/// reads or writes it.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Vec<ChatMessage>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one user/assistant exchange, trimming the oldest records once
    /// the session exceeds the bound.
    pub fn append_exchange(&self, session_id: &str, user_message: &str, assistant_message: &str) {
        let mut messages = self.sessions.entry(session_id.to_string()).or_default();
        messages.push(ChatMessage::user(user_message));
        messages.push(ChatMessage::assistant(assistant_message));
        let len = messages.len();
        if len > MAX_HISTORY_MESSAGES {
            messages.drain(..len - MAX_HISTORY_MESSAGES);
        }
    }

    /// The most recent records for the session, oldest first. Empty for
    /// unknown sessions.
    pub fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        self.sessions
            .get(session_id)
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRole;

    #[test]
    fn history_is_empty_for_unknown_session() {
        let store = SessionStore::new();
        assert!(store.history("nope").is_empty());
    }

    #[test]
    fn append_keeps_exchange_order() {
        let store = SessionStore::new();
        store.append_exchange("s1", "hello", "hi there");

        let history = store.history("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[0].content, "hello");
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[1].content, "hi there");
    }

    #[test]
    fn store_trims_oldest_records_past_the_bound() {
        let store = SessionStore::new();
        for i in 0..11 {
            store.append_exchange("s1", &format!("q{i}"), &format!("a{i}"));
        }

        let history = store.history("s1");
        assert_eq!(history.len(), MAX_HISTORY_MESSAGES);
        // The first exchange (q0/a0) was dropped.
        assert_eq!(history[0].content, "q1");
        assert_eq!(history.last().unwrap().content, "a10");
    }

    #[test]
    fn sessions_are_independent() {
        let store = SessionStore::new();
        store.append_exchange("a", "one", "two");
        store.append_exchange("b", "three", "four");
        assert_eq!(store.history("a").len(), 2);
        assert_eq!(store.history("b")[0].content, "three");
    }
}
