//! Message Lifecycle Service
//!
//! Validates and creates messages with a fixed time-to-live, serves recent
//! history, and runs the periodic expiry sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::domain::{Message, MessageStatus, MessageStore, NewMessage};
use crate::shared::error::StoreError;

/// History limit applied when the caller passes zero or a negative value.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Errors from posting a message.
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    /// Rejected synchronously; the store is never touched.
    #[error("message content cannot be empty")]
    EmptyContent,

    /// The store adapter failed. Logged by the caller and abandoned; retry,
    /// if any, belongs to the store adapter or an outer layer.
    #[error("failed to store message")]
    Storage(#[source] StoreError),
}

/// Message lifecycle service.
pub struct MessageService {
    store: Arc<dyn MessageStore>,
    message_ttl: chrono::Duration,
}

impl MessageService {
    pub fn new(store: Arc<dyn MessageStore>, message_ttl: chrono::Duration) -> Self {
        Self { store, message_ttl }
    }

    /// The fixed lifetime stamped on every posted message.
    pub fn message_ttl(&self) -> chrono::Duration {
        self.message_ttl
    }

    /// Validate and persist a message, stamping `created_at = now` and
    /// `expires_at = now + ttl`. Returns the stored message including its
    /// assigned identifier.
    pub async fn post_message(&self, author_id: i64, content: &str) -> Result<Message, PostError> {
        if content.is_empty() {
            return Err(PostError::EmptyContent);
        }

        let now = Utc::now();
        let message = NewMessage {
            author_id,
            content: content.to_owned(),
            status: MessageStatus::Active,
            created_at: now,
            expires_at: now + self.message_ttl,
        };

        self.store
            .create_message(message)
            .await
            .map_err(PostError::Storage)
    }

    /// Fetch recent messages in the store's natural recency order (newest
    /// first); no re-sorting is performed here. A non-positive `limit` is
    /// normalized to [`DEFAULT_HISTORY_LIMIT`].
    pub async fn recent_messages(&self, limit: i64) -> Result<Vec<Message>, StoreError> {
        let limit = if limit <= 0 {
            DEFAULT_HISTORY_LIMIT
        } else {
            limit
        };
        self.store.get_messages(limit).await
    }

    /// Launch the repeating expiry sweep.
    ///
    /// Every `interval`, expired messages are hard-deleted from the store.
    /// A failed sweep is logged and the next tick proceeds regardless. The
    /// returned handle cancels the sweep within one tick boundary; dropping
    /// it cancels as well.
    pub fn start_cleanup_routine(self: &Arc<Self>, interval: Duration) -> CleanupHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let service = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick of a tokio interval fires immediately; consume
            // it so the first sweep lands one full interval after startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match service.store.delete_expired_messages().await {
                            Ok(removed) if removed > 0 => {
                                tracing::debug!(removed, "expired messages deleted");
                            }
                            Ok(_) => {}
                            Err(e) => {
                                tracing::error!(error = %e, "expiry sweep failed");
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("expiry sweep stopped");
                        break;
                    }
                }
            }
        });

        CleanupHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Handle to the background expiry sweep. Dropping it cancels the sweep.
pub struct CleanupHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl CleanupHandle {
    /// Stop the sweep and wait for the task to release its timer.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for CleanupHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
