//! Message Store Implementation
//!
//! PostgreSQL implementation of the message store adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Message, MessageStatus, MessageStore, NewMessage};
use crate::shared::error::StoreError;

/// PostgreSQL message store.
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    /// Creates a new PgMessageStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for message queries.
/// Maps to the messages table schema defined in the migration.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    author_id: i64,
    content: String,
    status: String, // PostgreSQL enum maps to string
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl MessageRow {
    /// Converts database row to domain Message entity.
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            author_id: self.author_id,
            content: self.content,
            status: MessageStatus::from_str(&self.status),
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    /// Persist a new message.
    ///
    /// The identifier is assigned by the database sequence.
    async fn create_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (author_id, content, status, created_at, expires_at)
            VALUES ($1, $2, $3::message_status, $4, $5)
            RETURNING id, author_id, content,
                      status::text as status, created_at, expires_at
            "#,
        )
        .bind(message.author_id)
        .bind(&message.content)
        .bind(message.status.as_str())
        .bind(message.created_at)
        .bind(message.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_message())
    }

    /// Fetch the most recent messages, newest first.
    ///
    /// Messages past their `expires_at` but not yet swept are still
    /// returned; the sweep is advisory-periodic, not tied to reads.
    async fn get_messages(&self, limit: i64) -> Result<Vec<Message>, StoreError> {
        let limit = limit.clamp(1, 100);

        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, author_id, content,
                   status::text as status, created_at, expires_at
            FROM messages
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }

    /// Hard-delete every message past its expiry time.
    async fn delete_expired_messages(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM messages WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
