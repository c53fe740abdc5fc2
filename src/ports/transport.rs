//! Transport port - Interface for the realtime channel to the chat backend.
//!
//! A transport carries JSON frames both ways. Inbound frames arrive as a
//! stream opened once per connection attempt; outbound frames are sent one
//! at a time. Implementations differ in how they hold the connection
//! (long-lived streaming response vs repeated polling), not in what they
//! carry.

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::foundation::UserId;

/// Wire event name for an inbound chat message.
pub const MESSAGE_RECEIVED_EVENT: &str = "receiveMessage";

/// Wire event name for an outbound notification request.
pub const NOTIFICATION_REQUEST_EVENT: &str = "sendNotification";

/// One event on the wire: `{ "event": ..., "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportFrame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl TransportFrame {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Stream of inbound frames for one open connection.
///
/// An `Err` item reports a problem with a single frame or the connection;
/// the stream ending means the connection is gone.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<TransportFrame, TransportError>> + Send>>;

/// How a transport holds its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// One long-lived response carrying server-sent frames.
    Streaming,
    /// Repeated requests, each returning a batch of frames.
    Polling,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Streaming => "streaming",
            TransportKind::Polling => "polling",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "streaming" | "stream" => Ok(TransportKind::Streaming),
            "polling" | "poll" => Ok(TransportKind::Polling),
            other => Err(TransportError::InvalidConfig(format!(
                "unknown transport '{}'",
                other
            ))),
        }
    }
}

/// Errors raised by transports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection could not be made or broke mid-flight.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Credentials were refused.
    #[error("unauthorized")]
    Unauthorized,

    /// Server answered with a non-success status.
    #[error("rejected with status {status}")]
    Rejected { status: u16 },

    /// A frame could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The transport has no open connection.
    #[error("transport closed")]
    Closed,

    /// The transport cannot be used right now.
    #[error("transport unavailable: {0}")]
    Unavailable(String),

    /// Misconfigured endpoint, path or option.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        TransportError::Network(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        TransportError::Decode(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        TransportError::Unavailable(message.into())
    }

    /// Whether a later attempt may succeed without changing anything.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Network(_)
            | TransportError::Timeout { .. }
            | TransportError::Closed
            | TransportError::Unavailable(_) => true,
            TransportError::Rejected { status } => *status == 429 || *status >= 500,
            TransportError::Unauthorized
            | TransportError::Decode(_)
            | TransportError::InvalidConfig(_) => false,
        }
    }
}

/// Port for a realtime transport.
///
/// Implementations must:
/// - make each `open` an independent connection attempt
/// - end the returned stream when the connection is lost
/// - never block `send` on inbound traffic
#[async_trait]
pub trait Transport: Send + Sync {
    /// Which kind of transport this is (for preference order and logs).
    fn kind(&self) -> TransportKind;

    /// Opens a connection and returns its inbound frames.
    async fn open(&self) -> Result<FrameStream, TransportError>;

    /// Sends one outbound frame.
    async fn send(&self, frame: TransportFrame) -> Result<(), TransportError>;
}

/// Builds the transports for one user's connection, in preference order.
pub trait TransportFactory: Send + Sync {
    fn create(&self, user_id: &UserId) -> Result<Vec<Arc<dyn Transport>>, TransportError>;
}
