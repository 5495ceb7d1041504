//! Message entity and store trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::StoreError;

/// Stored message status.
///
/// Database definition:
/// ```sql
/// CREATE TYPE message_status AS ENUM ('active');
/// ```
///
/// `active` is the only recorded status: a message past its `expires_at` is
/// still stored as `active` until the next expiry sweep hard-deletes it.
/// There is no soft-expired state observable by readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// A live, readable message
    #[default]
    Active,
}

impl MessageStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "active" => Self::Active,
            _ => Self::Active,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
        }
    }
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A short-lived message posted to the board.
///
/// Maps to the `messages` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - author_id: BIGINT NOT NULL
/// - content: TEXT NOT NULL
/// - status: message_status NOT NULL DEFAULT 'active'
/// - created_at: TIMESTAMPTZ NOT NULL
/// - expires_at: TIMESTAMPTZ NOT NULL
///
/// Messages are read-only after creation; the only lifecycle transition is
/// hard deletion by the expiry sweep once `now > expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Store-assigned identifier (primary key)
    pub id: i64,

    /// Author user ID
    pub author_id: i64,

    /// Message content (non-empty, enforced by the lifecycle service)
    pub content: String,

    /// Stored status
    pub status: MessageStatus,

    /// Timestamp when the message was posted
    pub created_at: DateTime<Utc>,

    /// Timestamp after which the message becomes eligible for deletion
    pub expires_at: DateTime<Utc>,
}

impl Message {
    /// Check whether this message is past its expiry time.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// A message as handed to the store, before an identifier is assigned.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub author_id: i64,
    pub content: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Store adapter trait for message persistence.
///
/// Each call is independently atomic; no transaction spans calls.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message and return it with its assigned identifier.
    async fn create_message(&self, message: NewMessage) -> Result<Message, StoreError>;

    /// Fetch up to `limit` messages in the store's natural recency order
    /// (newest first).
    async fn get_messages(&self, limit: i64) -> Result<Vec<Message>, StoreError>;

    /// Hard-delete every message past its `expires_at`. Returns the number
    /// of messages removed.
    async fn delete_expired_messages(&self) -> Result<u64, StoreError>;
}
