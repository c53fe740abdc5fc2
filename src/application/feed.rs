//! NotificationFeed - the store shared between the connection and the UI.
//!
//! Inbound messages arrive on the connection task while user actions come
//! from elsewhere, so every mutation goes through one mutex. After each
//! change that altered the store a fresh `FeedSnapshot` is published on a
//! `watch` channel for observers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::domain::foundation::{ChannelId, MessageId, UserId, ValidationError};
use crate::domain::notification::{ChatMessage, Notification, NotificationStore, ReceiveOutcome};
use crate::ports::MessageHandler;

/// Immutable view of the store at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    /// Newest first.
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

impl FeedSnapshot {
    fn of(store: &NotificationStore) -> Self {
        Self {
            notifications: store.to_vec(),
            unread_count: store.unread_count(),
        }
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}

struct FeedInner {
    store: Mutex<NotificationStore>,
    snapshots: watch::Sender<FeedSnapshot>,
}

/// Serialized, observable notification store.
#[derive(Clone)]
pub struct NotificationFeed {
    inner: Arc<FeedInner>,
}

impl NotificationFeed {
    /// # Errors
    ///
    /// - `OutOfRange` if capacity is zero
    pub fn new(owner: UserId, capacity: usize) -> Result<Self, ValidationError> {
        let store = NotificationStore::with_capacity(owner, capacity)?;
        let (snapshots, _) = watch::channel(FeedSnapshot::of(&store));
        Ok(Self {
            inner: Arc::new(FeedInner {
                store: Mutex::new(store),
                snapshots,
            }),
        })
    }

    fn store(&self) -> MutexGuard<'_, NotificationStore> {
        self.inner
            .store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, store: &NotificationStore) {
        self.inner.snapshots.send_replace(FeedSnapshot::of(store));
    }

    pub fn receive(&self, message: ChatMessage) -> ReceiveOutcome {
        let mut store = self.store();
        let message_id = message.id.clone();
        let outcome = store.receive(message);
        match &outcome {
            ReceiveOutcome::Added { evicted } => {
                tracing::debug!(
                    owner = %store.owner(),
                    message_id = %message_id,
                    evicted = ?evicted.as_ref().map(|n| n.id().as_str()),
                    unread = store.unread_count(),
                    "Notification added"
                );
                self.publish(&store);
            }
            ReceiveOutcome::IgnoredOwnMessage => {
                tracing::trace!(message_id = %message_id, "Ignoring own message");
            }
            ReceiveOutcome::IgnoredDuplicate => {
                tracing::debug!(message_id = %message_id, "Ignoring redelivered message");
            }
        }
        outcome
    }

    pub fn mark_read(&self, id: &MessageId) -> bool {
        let mut store = self.store();
        let changed = store.mark_read(id);
        if changed {
            self.publish(&store);
        }
        changed
    }

    pub fn mark_all_read(&self) -> usize {
        let mut store = self.store();
        let changed = store.mark_all_read();
        if changed > 0 {
            self.publish(&store);
        }
        changed
    }

    /// Clears the feed and rebinds it to `owner`.
    pub fn reset(&self, owner: UserId) {
        let mut store = self.store();
        tracing::info!(previous = %store.owner(), owner = %owner, "Resetting notification feed");
        store.reset(owner);
        self.publish(&store);
    }

    pub fn owner(&self) -> UserId {
        self.store().owner().clone()
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.store().get(id).is_some()
    }

    pub fn unread_count(&self) -> usize {
        self.store().unread_count()
    }

    /// Conversation a notification belongs to, if it is still in the feed.
    pub fn channel_of(&self, id: &MessageId) -> Option<ChannelId> {
        self.store().get(id).map(|n| n.channel_id().clone())
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot::of(&self.store())
    }

    /// Receiver that sees a new snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.inner.snapshots.subscribe()
    }
}

impl MessageHandler for NotificationFeed {
    fn on_message(&self, message: &ChatMessage) {
        self.receive(message.clone());
    }

    fn name(&self) -> &'static str {
        "notification_feed"
    }
}
