//! Application layer - the notification feed and the actions on it.
//!
//! `NotificationSession` wires a user to their shared connection and feed.
//! Command handlers implement the user actions; `view` projects feed
//! snapshots into what the bell dropdown shows.

pub mod feed;
pub mod handlers;
pub mod session;
pub mod view;

pub use feed::{FeedSnapshot, NotificationFeed};
pub use handlers::{
    MarkAllReadHandler, MarkAllReadResult, NotifyRecipientCommand, NotifyRecipientHandler,
    OpenNotificationCommand, OpenNotificationHandler, OpenNotificationResult,
};
pub use session::NotificationSession;
pub use view::{NotificationDropdown, NotificationItem};
