//! Broadcast Hub
//!
//! Single coordinator owning the live session set. All mutation goes
//! through one control loop, so the set needs no lock: register,
//! unregister, and broadcast are processed one intent at a time.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::frames::BoardFrame;
use crate::application::MessageService;

/// A registered session as the hub sees it: identity plus the sole sending
/// side of the session's bounded outbound queue. Dropping the handle is
/// what closes the queue, so removal from the set closes it exactly once.
pub struct SessionHandle {
    session_id: Uuid,
    user_id: i64,
    username: String,
    sender: mpsc::Sender<BoardFrame>,
}

impl SessionHandle {
    pub fn new(
        session_id: Uuid,
        user_id: i64,
        username: impl Into<String>,
        sender: mpsc::Sender<BoardFrame>,
    ) -> Self {
        Self {
            session_id,
            user_id,
            username: username.into(),
            sender,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

/// Hub intents, processed sequentially by the control loop.
enum HubCommand {
    Register(SessionHandle),
    Unregister(Uuid),
    Broadcast(BoardFrame),
    SessionCount(oneshot::Sender<usize>),
}

/// Handle to the hub control loop. Cheap to clone; every clone feeds the
/// same loop.
#[derive(Clone)]
pub struct Hub {
    commands: mpsc::UnboundedSender<HubCommand>,
}

impl Hub {
    /// Spawn the control loop.
    ///
    /// `history_limit` caps the number of messages replayed to a newly
    /// registered session.
    pub fn spawn(messages: Arc<MessageService>, history_limit: i64) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        tokio::spawn(run(inbox, messages, history_limit));
        Self { commands }
    }

    /// Add a session to the live set and replay recent history to it.
    pub fn register(&self, handle: SessionHandle) {
        let _ = self.commands.send(HubCommand::Register(handle));
    }

    /// Remove a session from the live set, closing its outbound queue.
    /// A no-op for sessions that are not (or no longer) registered.
    pub fn unregister(&self, session_id: Uuid) {
        let _ = self.commands.send(HubCommand::Unregister(session_id));
    }

    /// Deliver a frame to every live session without blocking on any one
    /// of them.
    pub fn broadcast(&self, frame: BoardFrame) {
        let _ = self.commands.send(HubCommand::Broadcast(frame));
    }

    /// Number of currently registered sessions.
    ///
    /// Processed in intent order, so it doubles as a barrier behind any
    /// previously submitted register/unregister/broadcast.
    pub async fn session_count(&self) -> usize {
        let (reply, answer) = oneshot::channel();
        if self.commands.send(HubCommand::SessionCount(reply)).is_err() {
            return 0;
        }
        answer.await.unwrap_or(0)
    }
}

/// The control loop. Exclusive owner of the session set.
async fn run(
    mut inbox: mpsc::UnboundedReceiver<HubCommand>,
    messages: Arc<MessageService>,
    history_limit: i64,
) {
    let mut sessions: HashMap<Uuid, SessionHandle> = HashMap::new();

    while let Some(command) = inbox.recv().await {
        match command {
            HubCommand::Register(handle) => {
                tracing::info!(
                    session_id = %handle.session_id,
                    user_id = handle.user_id,
                    username = %handle.username,
                    "session registered"
                );
                let replay_to = handle.sender.clone();
                sessions.insert(handle.session_id, handle);

                // History replay must not hold up the control loop, and a
                // failed fetch must not undo the registration.
                let messages = Arc::clone(&messages);
                tokio::spawn(async move {
                    match messages.recent_messages(history_limit).await {
                        Ok(history) => {
                            // The store hands back newest first; replay oldest
                            // first so the client renders in posting order.
                            for message in history.iter().rev() {
                                if replay_to.send(BoardFrame::message(message)).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to fetch history for replay");
                        }
                    }
                });
            }

            HubCommand::Unregister(session_id) => {
                if let Some(handle) = sessions.remove(&session_id) {
                    tracing::info!(
                        session_id = %session_id,
                        user_id = handle.user_id,
                        "session unregistered"
                    );
                }
            }

            HubCommand::Broadcast(frame) => {
                let mut dead = Vec::new();
                for (session_id, handle) in &sessions {
                    // Non-blocking: a full or closed queue means the
                    // consumer is gone, not congested.
                    if handle.sender.try_send(frame.clone()).is_err() {
                        dead.push(*session_id);
                    }
                }
                for session_id in dead {
                    if let Some(handle) = sessions.remove(&session_id) {
                        tracing::warn!(
                            session_id = %session_id,
                            user_id = handle.user_id,
                            "dropping unresponsive session"
                        );
                    }
                }
            }

            HubCommand::SessionCount(reply) => {
                let _ = reply.send(sessions.len());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, MessageStatus, MessageStore, NewMessage};
    use crate::shared::error::StoreError;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use std::time::Duration as StdDuration;
    use tokio::time::timeout;

    /// Store preloaded with fixed history, newest first.
    #[derive(Default)]
    struct FixedStore {
        history: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl MessageStore for FixedStore {
        async fn create_message(&self, message: NewMessage) -> Result<Message, StoreError> {
            let stored = Message {
                id: 0,
                author_id: message.author_id,
                content: message.content,
                status: message.status,
                created_at: message.created_at,
                expires_at: message.expires_at,
            };
            self.history.lock().unwrap().insert(0, stored.clone());
            Ok(stored)
        }

        async fn get_messages(&self, limit: i64) -> Result<Vec<Message>, StoreError> {
            let history = self.history.lock().unwrap();
            Ok(history.iter().take(limit as usize).cloned().collect())
        }

        async fn delete_expired_messages(&self) -> Result<u64, StoreError> {
            Ok(0)
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl MessageStore for BrokenStore {
        async fn create_message(&self, _message: NewMessage) -> Result<Message, StoreError> {
            Err(StoreError::Internal("down".into()))
        }

        async fn get_messages(&self, _limit: i64) -> Result<Vec<Message>, StoreError> {
            Err(StoreError::Internal("down".into()))
        }

        async fn delete_expired_messages(&self) -> Result<u64, StoreError> {
            Err(StoreError::Internal("down".into()))
        }
    }

    fn stored(id: i64, content: &str) -> Message {
        let now = Utc::now();
        Message {
            id,
            author_id: 7,
            content: content.into(),
            status: MessageStatus::Active,
            created_at: now,
            expires_at: now + Duration::hours(24),
        }
    }

    fn hub_over(store: Arc<dyn MessageStore>) -> Hub {
        let service = Arc::new(MessageService::new(store, Duration::hours(24)));
        Hub::spawn(service, 50)
    }

    fn session(hub: &Hub, capacity: usize) -> (Uuid, mpsc::Receiver<BoardFrame>) {
        let (tx, rx) = mpsc::channel(capacity);
        let session_id = Uuid::new_v4();
        hub.register(SessionHandle::new(session_id, 7, "tester", tx));
        (session_id, rx)
    }

    fn frame(content: &str) -> BoardFrame {
        BoardFrame::message(&stored(1, content))
    }

    async fn recv(rx: &mut mpsc::Receiver<BoardFrame>) -> Option<BoardFrame> {
        timeout(StdDuration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for frame")
    }

    #[tokio::test]
    async fn broadcast_reaches_every_registered_session() {
        let hub = hub_over(Arc::new(FixedStore::default()));
        let (_, mut rx_a) = session(&hub, 8);
        let (_, mut rx_b) = session(&hub, 8);
        let (_, mut rx_c) = session(&hub, 8);

        let fan_out = frame("fan-out");
        hub.broadcast(fan_out.clone());
        assert_eq!(hub.session_count().await, 3);

        for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
            assert_eq!(recv(rx).await, Some(fan_out.clone()));
        }
    }

    #[tokio::test]
    async fn unregister_closes_the_queue_and_is_idempotent() {
        let hub = hub_over(Arc::new(FixedStore::default()));
        let (session_id, mut rx) = session(&hub, 8);
        assert_eq!(hub.session_count().await, 1);

        hub.unregister(session_id);
        hub.unregister(session_id);
        assert_eq!(hub.session_count().await, 0);

        // Queue closed by removal; recv drains to None.
        assert_eq!(recv(&mut rx).await, None);

        // Frames broadcast after removal never arrive.
        hub.broadcast(frame("late"));
        assert_eq!(hub.session_count().await, 0);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn saturated_session_is_evicted_within_the_broadcast_step() {
        let hub = hub_over(Arc::new(FixedStore::default()));
        let (_, mut slow_rx) = session(&hub, 1);
        let (_, mut healthy_rx) = session(&hub, 8);

        let first = frame("first");
        let second = frame("second");
        let third = frame("third");

        hub.broadcast(first.clone());
        hub.broadcast(second.clone()); // slow queue is full here

        assert_eq!(hub.session_count().await, 1);
        assert_eq!(recv(&mut healthy_rx).await, Some(first.clone()));
        assert_eq!(recv(&mut healthy_rx).await, Some(second.clone()));

        // The evicted session keeps what was already queued and nothing more.
        assert_eq!(recv(&mut slow_rx).await, Some(first));
        assert_eq!(recv(&mut slow_rx).await, None);

        hub.broadcast(third.clone());
        assert_eq!(hub.session_count().await, 1);
        assert_eq!(recv(&mut healthy_rx).await, Some(third));
    }

    #[tokio::test]
    async fn history_replays_chronologically_to_the_new_session_only() {
        let store = Arc::new(FixedStore::default());
        let oldest = stored(1, "first");
        let middle = stored(2, "second");
        let newest = stored(3, "third");
        // Newest first, as the store contract says.
        *store.history.lock().unwrap() = vec![newest.clone(), middle.clone(), oldest.clone()];
        let hub = hub_over(store.clone());

        let (_, mut rx_old) = session(&hub, 8);
        assert_eq!(recv(&mut rx_old).await, Some(BoardFrame::message(&oldest)));
        assert_eq!(recv(&mut rx_old).await, Some(BoardFrame::message(&middle)));
        assert_eq!(recv(&mut rx_old).await, Some(BoardFrame::message(&newest)));

        // A later registration replays to the newcomer, not to rx_old.
        let (_, mut rx_new) = session(&hub, 8);
        assert_eq!(recv(&mut rx_new).await, Some(BoardFrame::message(&oldest)));

        let live = frame("live");
        hub.broadcast(live.clone());
        assert_eq!(recv(&mut rx_old).await, Some(live));
    }

    #[tokio::test]
    async fn registration_survives_a_failed_history_fetch() {
        let hub = hub_over(Arc::new(BrokenStore));
        let (_, mut rx) = session(&hub, 8);

        assert_eq!(hub.session_count().await, 1);

        let delivered = frame("still delivered");
        hub.broadcast(delivered.clone());
        assert_eq!(recv(&mut rx).await, Some(delivered));
    }
}
