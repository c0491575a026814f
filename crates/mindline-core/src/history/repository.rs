//! HistoryRepository trait definition.
//!
//! A durable, keyed, ordered message log. Sessions are implicit: they come
//! into existence on first append and cease to exist when cleared. Uses
//! native async fn in traits (RPITIT, Rust 2024 edition).

use mindline_types::error::HistoryError;
use mindline_types::message::{MessageRole, StoredMessage};

/// Repository trait for per-session message persistence.
///
/// Implementations live in mindline-infra (e.g., `SqliteHistoryRepository`).
pub trait HistoryRepository: Send + Sync {
    /// All messages for a session, in submission order.
    ///
    /// An unknown session is an empty sequence, not an error.
    fn history(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<StoredMessage>, HistoryError>> + Send;

    /// Append a single message to a session's log.
    fn append(
        &self,
        session_id: &str,
        role: MessageRole,
        content: &str,
    ) -> impl std::future::Future<Output = Result<(), HistoryError>> + Send;

    /// Append a completed turn (user message, then assistant message) as
    /// one atomic store operation.
    ///
    /// The default implementation issues two sequential appends; stores
    /// that can do better (e.g., a SQL transaction) should override it so
    /// a user message can never be persisted without its assistant reply.
    fn append_turn(
        &self,
        session_id: &str,
        user_content: &str,
        assistant_content: &str,
    ) -> impl std::future::Future<Output = Result<(), HistoryError>> + Send {
        async move {
            self.append(session_id, MessageRole::User, user_content)
                .await?;
            self.append(session_id, MessageRole::Assistant, assistant_content)
                .await
        }
    }

    /// Delete all messages for a session. Returns the number of messages
    /// removed.
    ///
    /// Idempotent: clearing an empty or unknown session returns `Ok(0)`.
    fn clear(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, HistoryError>> + Send;
}
