//! Domain layer containing the notification feed's business rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `user` - User snapshots taken from inbound messages
//! - `notification` - Chat messages, notifications and the bounded store

pub mod foundation;
pub mod notification;
pub mod user;
