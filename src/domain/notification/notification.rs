//! Notification entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChannelId, MessageId, Timestamp};
use crate::domain::user::User;

use super::ChatMessage;

/// One received chat message as shown in the notification dropdown.
///
/// # Invariants
///
/// - `id` is the originating message id, never regenerated
/// - only `read` changes after construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    id: MessageId,
    sender: User,
    content: String,
    channel_id: ChannelId,
    timestamp: Timestamp,
    read: bool,
}

impl Notification {
    /// Builds an unread notification from a received message.
    pub fn from_message(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            sender: message.sender,
            content: message.content,
            channel_id: message.channel_id,
            timestamp: message.created_at,
            read: false,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn sender(&self) -> &User {
        &self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    /// Upstream creation time of the message (not receipt time).
    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    /// Marks as read. Returns `true` if this changed the state.
    pub(crate) fn mark_read(&mut self) -> bool {
        let changed = !self.read;
        self.read = true;
        changed
    }
}
