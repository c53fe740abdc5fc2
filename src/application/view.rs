//! Dropdown view model for the notification bell.
//!
//! Pure projection of a `FeedSnapshot`; rendering is left to the host.

use serde::Serialize;

use crate::domain::notification::Notification;
use crate::ports::chat_route;

use super::feed::FeedSnapshot;

/// Characters of content shown per item.
pub const PREVIEW_CHARS: usize = 80;

/// Badge text for counts above this is "99+".
pub const BADGE_MAX: usize = 99;

/// One row of the dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    pub id: String,
    pub sender_name: String,
    pub avatar_url: Option<String>,
    pub preview: String,
    pub unread: bool,
    pub chat_route: String,
    pub received_at: String,
}

impl From<&Notification> for NotificationItem {
    fn from(notification: &Notification) -> Self {
        let sender = notification.sender();
        Self {
            id: notification.id().to_string(),
            sender_name: sender.display_name(),
            avatar_url: sender.profile_picture().map(str::to_string),
            preview: preview(notification.content(), PREVIEW_CHARS),
            unread: !notification.is_read(),
            chat_route: chat_route(notification.channel_id()),
            received_at: notification.timestamp().to_rfc3339(),
        }
    }
}

/// What the bell and its dropdown show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDropdown {
    /// Hidden (`None`) when nothing is unread.
    pub badge: Option<String>,
    pub items: Vec<NotificationItem>,
    pub can_mark_all_read: bool,
}

impl NotificationDropdown {
    pub fn from_snapshot(snapshot: &FeedSnapshot) -> Self {
        Self {
            badge: badge(snapshot.unread_count),
            items: snapshot.notifications.iter().map(NotificationItem::from).collect(),
            can_mark_all_read: snapshot.unread_count > 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn badge(unread: usize) -> Option<String> {
    match unread {
        0 => None,
        n if n > BADGE_MAX => Some(format!("{}+", BADGE_MAX)),
        n => Some(n.to_string()),
    }
}

/// First `max` characters of `content`, with an ellipsis if cut.
fn preview(content: &str, max: usize) -> String {
    let trimmed = content.trim();
    match trimmed.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", trimmed[..cut].trim_end()),
        None => trimmed.to_string(),
    }
}
