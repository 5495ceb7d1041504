//! Wire Frame Types
//!
//! JSON payloads exchanged over a board connection. History replay and live
//! broadcast share the same outbound shape.

use serde::{Deserialize, Serialize};

use crate::domain::Message;

/// Outbound frame delivered to viewers.
///
/// Serializes as `{"type": "message", "id": ..., "user_id": ...,
/// "content": ..., "time": <RFC3339>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardFrame {
    Message {
        id: i64,
        user_id: i64,
        content: String,
        time: String,
    },
}

impl BoardFrame {
    /// Build the broadcast frame for a stored message.
    pub fn message(message: &Message) -> Self {
        BoardFrame::Message {
            id: message.id,
            user_id: message.author_id,
            content: message.content.clone(),
            time: message.created_at.to_rfc3339(),
        }
    }
}

/// Inbound frame from a client posting a message.
#[derive(Debug, Deserialize)]
pub struct PostFrame {
    pub content: String,
}
