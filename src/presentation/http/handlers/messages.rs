//! Message History Handler
//!
//! REST read of recent board history, mirroring the shape delivered over
//! the WebSocket.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::Message;
use crate::presentation::http::extractors::Identity;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Query parameters for history reads. A missing, zero, or negative limit
/// falls back to the service default.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: i64,
}

/// One message in a history response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub time: String,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            user_id: message.author_id,
            content: message.content.clone(),
            time: message.created_at.to_rfc3339(),
        }
    }
}

/// `GET /messages` - recent messages, newest first.
pub async fn get_messages(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    tracing::debug!(user_id = identity.user_id, limit = query.limit, "history read");

    let messages = state.messages.recent_messages(query.limit).await?;
    Ok(Json(messages.iter().map(MessageResponse::from).collect()))
}
