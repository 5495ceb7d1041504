//! Client Session Pumps
//!
//! Two concurrent pumps per connection: the reader decodes inbound posts
//! and feeds the hub, the writer drains the session's outbound queue onto
//! the wire. A read failure or clean close is the sole teardown trigger;
//! queue closure (by the hub) ends the writer.

use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use super::connection::{FrameSink, FrameStream};
use super::frames::{BoardFrame, PostFrame};
use super::hub::Hub;
use crate::application::MessageService;

/// Read inbound frames until the connection errors or closes, posting each
/// decoded message and submitting the stored result for broadcast.
/// Unregisters the session from the hub on exit.
pub async fn read_pump<R: FrameStream>(
    session_id: Uuid,
    user_id: i64,
    hub: Hub,
    messages: Arc<MessageService>,
    mut stream: R,
) {
    loop {
        match stream.next_frame().await {
            Ok(Some(payload)) => {
                let post: PostFrame = match serde_json::from_str(&payload) {
                    Ok(post) => post,
                    Err(e) => {
                        // Malformed input is skipped; the connection stays open.
                        tracing::debug!(%session_id, error = %e, "malformed inbound frame");
                        continue;
                    }
                };

                match messages.post_message(user_id, &post.content).await {
                    Ok(message) => hub.broadcast(BoardFrame::message(&message)),
                    Err(e) => {
                        tracing::warn!(
                            %session_id,
                            user_id,
                            error = %e,
                            "failed to post message"
                        );
                    }
                }
            }
            Ok(None) => {
                tracing::debug!(%session_id, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(%session_id, error = %e, "read error");
                break;
            }
        }
    }

    hub.unregister(session_id);
}

/// Drain the outbound queue onto the wire in arrival order. When the queue
/// closes, send a close control frame and return.
pub async fn write_pump<W: FrameSink>(mut outbound: mpsc::Receiver<BoardFrame>, mut sink: W) {
    while let Some(frame) = outbound.recv().await {
        let payload = match serde_json::to_string(&frame) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize outbound frame");
                continue;
            }
        };

        if let Err(e) = sink.send_text(payload).await {
            tracing::debug!(error = %e, "write error");
            break;
        }
    }

    let _ = sink.send_close().await;
}
