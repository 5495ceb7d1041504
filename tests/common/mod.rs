//! Common Test Utilities
//!
//! In-memory store and in-memory duplex connection halves for driving the
//! hub and session pumps without a database or a real socket.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use pulse_board::application::MessageService;
use pulse_board::domain::{Message, MessageStore, NewMessage};
use pulse_board::presentation::websocket::session::{read_pump, write_pump};
use pulse_board::presentation::websocket::{FrameSink, FrameStream, Hub, SessionHandle};
use pulse_board::shared::error::{StoreError, TransportError};

/// In-memory message store honoring the adapter contract: ids assigned on
/// create, reads newest first, expired rows removed by the sweep.
#[derive(Default)]
pub struct MemoryStore {
    pub messages: Mutex<Vec<Message>>,
    next_id: AtomicI64,
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        let stored = Message {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            author_id: message.author_id,
            content: message.content,
            status: message.status,
            created_at: message.created_at,
            expires_at: message.expires_at,
        };
        self.messages.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn get_messages(&self, limit: i64) -> Result<Vec<Message>, StoreError> {
        let messages = self.messages.lock().unwrap();
        Ok(messages.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn delete_expired_messages(&self) -> Result<u64, StoreError> {
        let now = chrono::Utc::now();
        let mut messages = self.messages.lock().unwrap();
        let before = messages.len();
        messages.retain(|m| !m.is_expired_at(now));
        Ok((before - messages.len()) as u64)
    }
}

/// Inbound half fed from a channel; channel closure reads as a clean close.
pub struct ChannelStream {
    rx: mpsc::Receiver<Result<String, TransportError>>,
}

#[async_trait]
impl FrameStream for ChannelStream {
    async fn next_frame(&mut self) -> Result<Option<String>, TransportError> {
        match self.rx.recv().await {
            Some(Ok(payload)) => Ok(Some(payload)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

/// What a client observed on its outbound half.
#[derive(Debug, PartialEq)]
pub enum SinkEvent {
    Text(String),
    Close,
}

/// Outbound half recording everything written to it.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn send_text(&mut self, payload: String) -> Result<(), TransportError> {
        self.tx
            .send(SinkEvent::Text(payload))
            .map_err(|_| TransportError::new("sink gone"))
    }

    async fn send_close(&mut self) -> Result<(), TransportError> {
        self.tx
            .send(SinkEvent::Close)
            .map_err(|_| TransportError::new("sink gone"))
    }
}

/// One simulated connected client: both pumps running, wired to the hub
/// the same way the WebSocket handler wires a real connection.
pub struct TestClient {
    pub session_id: Uuid,
    /// Feed inbound frames (or transport faults); drop to close cleanly.
    pub to_server: mpsc::Sender<Result<String, TransportError>>,
    /// Everything the writer pump put on the wire.
    pub from_server: mpsc::UnboundedReceiver<SinkEvent>,
    pub reader: JoinHandle<()>,
    pub writer: JoinHandle<()>,
}

impl TestClient {
    pub fn connect(
        hub: &Hub,
        messages: &Arc<MessageService>,
        user_id: i64,
        username: &str,
        queue_capacity: usize,
    ) -> Self {
        let session_id = Uuid::new_v4();
        let (to_server, inbound_rx) = mpsc::channel(32);
        let (wire_tx, from_server) = mpsc::unbounded_channel();
        let (queue_tx, queue_rx) = mpsc::channel(queue_capacity);

        hub.register(SessionHandle::new(session_id, user_id, username, queue_tx));

        let writer = tokio::spawn(write_pump(queue_rx, ChannelSink { tx: wire_tx }));
        let reader = tokio::spawn(read_pump(
            session_id,
            user_id,
            hub.clone(),
            Arc::clone(messages),
            ChannelStream { rx: inbound_rx },
        ));

        Self {
            session_id,
            to_server,
            from_server,
            reader,
            writer,
        }
    }

    /// Post a message as this client.
    pub async fn post(&self, content: &str) {
        self.to_server
            .send(Ok(format!(r#"{{"content":"{}"}}"#, content)))
            .await
            .expect("reader pump gone");
    }

    /// Next event written to this client's wire, with a timeout.
    pub async fn next_event(&mut self) -> Option<SinkEvent> {
        tokio::time::timeout(std::time::Duration::from_secs(1), self.from_server.recv())
            .await
            .expect("timed out waiting for wire event")
    }
}

/// Decode a wire event as a board message, returning (user_id, content).
pub fn decode_message(event: &SinkEvent) -> (i64, String) {
    match event {
        SinkEvent::Text(payload) => {
            let value: serde_json::Value = serde_json::from_str(payload).expect("invalid JSON");
            assert_eq!(value["type"], "message");
            (
                value["user_id"].as_i64().expect("missing user_id"),
                value["content"].as_str().expect("missing content").to_owned(),
            )
        }
        SinkEvent::Close => panic!("expected a message frame, got close"),
    }
}
