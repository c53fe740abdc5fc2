//! Realtime adapters - the connection to the messaging service.
//!
//! ```text
//! ConnectionManager ──acquire(user)──► RealtimeClient ──subscribe──► MessageHandler
//!                                          │
//!                         ┌────────────────┴────────────────┐
//!                 HttpStreamingTransport           HttpPollingTransport
//!                  GET {path}/stream (SSE)          GET {path}/poll
//!                         └──────── POST {path}/emit ───────┘
//! ```
//!
//! `InMemoryTransport` stands in for both HTTP transports in tests.

mod client;
mod connections;
mod http;
mod in_memory;
mod messages;
mod polling;
mod registry;
mod sse;
mod streaming;

pub use client::{ClientId, ClientOptions, ConnectionState, RealtimeClient, WeakRealtimeClient};
pub use connections::ConnectionManager;
pub use http::{HttpTransportConfig, HttpTransportFactory, DEFAULT_REALTIME_PATH};
pub use in_memory::{InMemoryTransport, InMemoryTransportFactory};
pub use messages::{
    decode_chat_message, encode_notification_request, MessageReceivedPayload,
    NotificationRequestPayload, SenderPayload,
};
pub use polling::{HttpPollingTransport, PollBatch};
pub use registry::{HandlerRegistry, Subscription, SubscriptionId};
pub use sse::SseDecoder;
pub use streaming::HttpStreamingTransport;
