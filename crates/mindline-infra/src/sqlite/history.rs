//! SQLite history repository implementation.
//!
//! Implements `HistoryRepository` from `mindline-core` using sqlx with
//! split read/write pools: raw queries, a private Row struct, reads on the
//! reader pool and writes on the writer pool. `append_turn` runs both
//! inserts in a single transaction so a user message is never committed
//! without its assistant reply.

use chrono::{DateTime, Utc};
use sqlx::Row;

use mindline_core::history::repository::HistoryRepository;
use mindline_types::error::HistoryError;
use mindline_types::message::{MessageRole, StoredMessage};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `HistoryRepository`.
#[derive(Clone)]
pub struct SqliteHistoryRepository {
    pool: DatabasePool,
}

impl SqliteHistoryRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain StoredMessage.
struct MessageRow {
    seq: i64,
    session_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            seq: row.try_get("seq")?,
            session_id: row.try_get("session_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<StoredMessage, HistoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| HistoryError::Query(e))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(StoredMessage {
            seq: self.seq,
            session_id: self.session_id,
            role,
            content: self.content,
            created_at,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, HistoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| HistoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl HistoryRepository for SqliteHistoryRepository {
    async fn history(&self, session_id: &str) -> Result<Vec<StoredMessage>, HistoryError> {
        let rows = sqlx::query(
            "SELECT seq, session_id, role, content, created_at FROM messages WHERE session_id = ? ORDER BY seq ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| HistoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let message_row =
                MessageRow::from_row(row).map_err(|e| HistoryError::Query(e.to_string()))?;
            messages.push(message_row.into_message()?);
        }

        Ok(messages)
    }

    async fn append(
        &self,
        session_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<(), HistoryError> {
        sqlx::query(
            "INSERT INTO messages (session_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(role.to_string())
        .bind(content)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| HistoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn append_turn(
        &self,
        session_id: &str,
        user_content: &str,
        assistant_content: &str,
    ) -> Result<(), HistoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| HistoryError::Query(e.to_string()))?;

        let now = format_datetime(&Utc::now());

        sqlx::query(
            "INSERT INTO messages (session_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(MessageRole::User.to_string())
        .bind(user_content)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| HistoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO messages (session_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(MessageRole::Assistant.to_string())
        .bind(assistant_content)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| HistoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| HistoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<u64, HistoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| HistoryError::Query(e.to_string()))?;

        // rows_affected == 0 is a successful no-op: clearing is idempotent.
        Ok(result.rows_affected())
    }
}
