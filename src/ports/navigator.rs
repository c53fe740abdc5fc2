//! Navigator port - Interface to the host application's router.

use async_trait::async_trait;

use crate::domain::foundation::{ChannelId, DomainError};

/// Route prefix of the chat view.
pub const CHAT_ROUTE_PREFIX: &str = "/chat";

/// Route of the chat view for one conversation, e.g. `/chat/c-42`.
pub fn chat_route(channel_id: &ChannelId) -> String {
    format!("{}/{}", CHAT_ROUTE_PREFIX, channel_id)
}

/// Port for moving the user to a chat view.
///
/// The router itself lives outside this crate; opening a notification only
/// needs to name the conversation to show.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn open_chat(&self, channel_id: &ChannelId) -> Result<(), DomainError>;
}
