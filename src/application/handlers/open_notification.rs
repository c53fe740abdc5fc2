//! OpenNotificationHandler - Command handler for clicking a notification.

use std::sync::Arc;

use crate::domain::foundation::{ChannelId, DomainError, ErrorCode, MessageId};
use crate::ports::Navigator;

use crate::application::feed::NotificationFeed;

/// Command to open one notification.
#[derive(Debug, Clone)]
pub struct OpenNotificationCommand {
    pub notification_id: MessageId,
}

/// Result of opening a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenNotificationResult {
    pub channel_id: ChannelId,
    /// False if it was already read.
    pub marked_read: bool,
    pub unread_count: usize,
}

/// Marks the notification read, then navigates to its conversation.
pub struct OpenNotificationHandler {
    feed: NotificationFeed,
    navigator: Arc<dyn Navigator>,
}

impl OpenNotificationHandler {
    pub fn new(feed: NotificationFeed, navigator: Arc<dyn Navigator>) -> Self {
        Self { feed, navigator }
    }

    pub async fn handle(
        &self,
        cmd: OpenNotificationCommand,
    ) -> Result<OpenNotificationResult, DomainError> {
        // 1. Resolve the conversation
        let channel_id = self
            .feed
            .channel_of(&cmd.notification_id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::NotificationNotFound, "Notification not found")
                    .with_detail("notification_id", cmd.notification_id.as_str())
            })?;

        // 2. Mark read before leaving the dropdown
        let marked_read = self.feed.mark_read(&cmd.notification_id);

        // 3. Navigate
        self.navigator.open_chat(&channel_id).await?;

        Ok(OpenNotificationResult {
            channel_id,
            marked_read,
            unread_count: self.feed.unread_count(),
        })
    }
}
