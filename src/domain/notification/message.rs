//! Inbound chat message, validated.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChannelId, MessageId, Timestamp};
use crate::domain::user::User;

/// A chat message delivered by the realtime transport.
///
/// Construction goes through the wire decoder, which rejects payloads
/// missing any required field. Once built the message is immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: User,
    pub content: String,
    pub channel_id: ChannelId,
    /// When the message was created upstream.
    pub created_at: Timestamp,
}

impl ChatMessage {
    pub fn new(
        id: MessageId,
        sender: User,
        content: impl Into<String>,
        channel_id: ChannelId,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            sender,
            content: content.into(),
            channel_id,
            created_at,
        }
    }
}
