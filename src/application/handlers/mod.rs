//! Command handlers for user actions on notifications.

mod mark_all_read;
mod notify_recipient;
mod open_notification;

pub use mark_all_read::{MarkAllReadHandler, MarkAllReadResult};
pub use notify_recipient::{NotifyRecipientCommand, NotifyRecipientHandler};
pub use open_notification::{
    OpenNotificationCommand, OpenNotificationHandler, OpenNotificationResult,
};
