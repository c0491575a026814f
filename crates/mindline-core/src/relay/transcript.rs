//! The in-memory view of a session's conversation.
//!
//! `Transcript` is the explicit, owned object handed to the rendering
//! boundary. It mirrors the durable store after every completed turn; the
//! two may diverge only while a turn is streaming, or persistently after a
//! reported persistence failure.

use mindline_types::message::{Message, StoredMessage};

/// Owned, ordered view of a session's messages for rendering.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// An empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a transcript from stored history, preserving order.
    pub fn from_stored(stored: Vec<StoredMessage>) -> Self {
        Self {
            messages: stored.into_iter().map(Message::from).collect(),
        }
    }

    /// Messages in submission order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Record a completed turn (user input, assembled assistant reply).
    pub fn push_turn(&mut self, user_content: impl Into<String>, assistant_content: impl Into<String>) {
        self.messages.push(Message::user(user_content));
        self.messages.push(Message::assistant(assistant_content));
    }

    /// Drop all messages (session reset).
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mindline_types::message::MessageRole;

    #[test]
    fn test_push_turn_alternates() {
        let mut transcript = Transcript::new();
        transcript.push_turn("What is anxiety?", "Anxiety is...");
        transcript.push_turn("And depression?", "Depression is...");

        assert_eq!(transcript.len(), 4);
        let roles: Vec<MessageRole> = transcript.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::Assistant,
            ]
        );
    }

    #[test]
    fn test_from_stored_preserves_order() {
        let stored = vec![
            StoredMessage {
                seq: 1,
                session_id: "u1".to_string(),
                role: MessageRole::User,
                content: "hello".to_string(),
                created_at: Utc::now(),
            },
            StoredMessage {
                seq: 2,
                session_id: "u1".to_string(),
                role: MessageRole::Assistant,
                content: "hi there".to_string(),
                created_at: Utc::now(),
            },
        ];
        let transcript = Transcript::from_stored(stored);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].content, "hello");
        assert_eq!(transcript.messages()[1].role, MessageRole::Assistant);
    }

    #[test]
    fn test_clear_empties() {
        let mut transcript = Transcript::new();
        transcript.push_turn("a", "b");
        assert!(!transcript.is_empty());
        transcript.clear();
        assert!(transcript.is_empty());
        transcript.clear();
        assert!(transcript.is_empty());
    }
}
