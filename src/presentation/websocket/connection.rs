//! Duplex Connection Seam
//!
//! The hub and pumps work against an already-established duplex connection,
//! abstracted as one inbound and one outbound half. The axum WebSocket
//! implementation lives here; tests supply in-memory halves.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};

use crate::shared::error::TransportError;

/// Inbound half of a board connection.
#[async_trait]
pub trait FrameStream: Send {
    /// Next text frame, or `Ok(None)` on a clean close.
    async fn next_frame(&mut self) -> Result<Option<String>, TransportError>;
}

/// Outbound half of a board connection.
///
/// Both halves of one connection may close it; close is idempotent at the
/// transport level.
#[async_trait]
pub trait FrameSink: Send {
    async fn send_text(&mut self, payload: String) -> Result<(), TransportError>;

    /// Send a close control frame.
    async fn send_close(&mut self) -> Result<(), TransportError>;
}

/// Inbound half of a split axum WebSocket.
pub struct WsFrameStream {
    inner: SplitStream<WebSocket>,
}

impl WsFrameStream {
    pub fn new(inner: SplitStream<WebSocket>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl FrameStream for WsFrameStream {
    async fn next_frame(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            match self.inner.next().await {
                None => return Ok(None),
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().to_owned())),
                Some(Ok(Message::Close(_))) => return Ok(None),
                // Ping/pong are answered by axum; binary frames carry no
                // board payloads and are skipped.
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(TransportError::from(e)),
            }
        }
    }
}

/// Outbound half of a split axum WebSocket.
pub struct WsFrameSink {
    inner: SplitSink<WebSocket, Message>,
}

impl WsFrameSink {
    pub fn new(inner: SplitSink<WebSocket, Message>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl FrameSink for WsFrameSink {
    async fn send_text(&mut self, payload: String) -> Result<(), TransportError> {
        self.inner
            .send(Message::Text(payload.into()))
            .await
            .map_err(TransportError::from)
    }

    async fn send_close(&mut self) -> Result<(), TransportError> {
        self.inner
            .send(Message::Close(None))
            .await
            .map_err(TransportError::from)
    }
}
