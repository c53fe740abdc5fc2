//! Notification module - the realtime chat notification feed.
//!
//! Inbound chat messages from other users become `Notification`s held in a
//! bounded, newest-first `NotificationStore`. Recruiter actions produce
//! outbound `NotificationRequest`s.

mod message;
mod notification;
mod request;
mod store;

pub use message::ChatMessage;
pub use notification::Notification;
pub use request::{kinds, NotificationRequest};
pub use store::{NotificationStore, ReceiveOutcome, DEFAULT_CAPACITY};
