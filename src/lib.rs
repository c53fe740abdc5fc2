//! Job Notifications - realtime chat notification feed for the job board.
//!
//! Connects a signed-in user to the messaging service, turns inbound chat
//! messages into a bounded, newest-first notification feed with an unread
//! counter, and sends fire-and-forget notification requests to other users.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
