//! MarkAllReadHandler - Command handler for "mark all as read".

use crate::application::feed::NotificationFeed;

/// Result of marking everything read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkAllReadResult {
    /// Notifications that were unread before.
    pub changed: usize,
}

pub struct MarkAllReadHandler {
    feed: NotificationFeed,
}

impl MarkAllReadHandler {
    pub fn new(feed: NotificationFeed) -> Self {
        Self { feed }
    }

    pub fn handle(&self) -> MarkAllReadResult {
        let changed = self.feed.mark_all_read();
        tracing::debug!(owner = %self.feed.owner(), changed, "Marked all notifications read");
        MarkAllReadResult { changed }
    }
}
