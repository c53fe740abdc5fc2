//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the notification domain and the outside world. Adapters implement them.
//!
//! ## Realtime Ports
//!
//! - `Transport` - Bidirectional frame channel to the chat backend
//! - `TransportFactory` - Builds a user's transports in preference order
//! - `MessageHandler` - Callback for inbound chat messages
//! - `NotificationEmitter` - Fire-and-forget outbound notification requests
//!
//! ## Host Ports
//!
//! - `Navigator` - The host application's router

mod message_handler;
mod navigator;
mod notification_emitter;
mod transport;

pub use message_handler::{FnHandler, MessageHandler};
pub use navigator::{chat_route, Navigator, CHAT_ROUTE_PREFIX};
pub use notification_emitter::NotificationEmitter;
pub use transport::{
    FrameStream, Transport, TransportError, TransportFactory, TransportFrame, TransportKind,
    MESSAGE_RECEIVED_EVENT, NOTIFICATION_REQUEST_EVENT,
};
