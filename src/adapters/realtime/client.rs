//! Realtime client - one user's connection to the messaging service.
//!
//! The client owns two background tasks:
//!
//! ```text
//!             ┌──────────────────────────────┐
//!  transports │ connection task              │  HandlerRegistry
//!  ──────────►│ open → pump frames → backoff ├──────────────────► handlers
//!             └──────────────┬───────────────┘
//!                            │ active transport, state
//!             ┌──────────────▼───────────────┐
//!  emit() ───►│ sender task (bounded queue)  ├──────────────────► transport.send
//!             └──────────────────────────────┘
//! ```
//!
//! Transports are tried in preference order on every (re)connect, so a
//! fallback transport is only used while the preferred one cannot be
//! opened. After a lost connection or a round where nothing opened, the
//! client waits `min(base * 2^(attempt-1), max_backoff)` before retrying.
//! Failures that cannot clear up on their own (rejected credentials, a
//! missing route, bad configuration) are logged at error level and wait the
//! full `max_backoff`.
//!
//! Handles are cheap clones sharing one connection. Dropping the last
//! handle signals shutdown and both tasks stop.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::StreamExt;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::foundation::UserId;
use crate::domain::notification::NotificationRequest;
use crate::ports::{
    FrameStream, MessageHandler, NotificationEmitter, Transport, TransportError, TransportFrame,
    TransportKind, MESSAGE_RECEIVED_EVENT,
};

use super::messages::{decode_chat_message, encode_notification_request};
use super::registry::{HandlerRegistry, Subscription};

/// Tuning for reconnects and the outbound queue.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Delay before the first retry.
    pub reconnect_base: Duration,
    /// Upper bound on the retry delay.
    pub max_backoff: Duration,
    /// Outbound frames buffered while disconnected or sending.
    pub outbound_queue: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            reconnect_base: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            outbound_queue: 64,
        }
    }
}

impl ClientOptions {
    pub fn with_reconnect_base(mut self, base: Duration) -> Self {
        self.reconnect_base = base;
        self
    }

    pub fn with_max_backoff(mut self, max: Duration) -> Self {
        self.max_backoff = max;
        self
    }

    pub fn with_outbound_queue(mut self, size: usize) -> Self {
        self.outbound_queue = size;
        self
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.reconnect_base
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }

    /// Delay after a failure; non-retryable failures skip the ramp.
    pub fn retry_delay(&self, attempt: u32, retryable: bool) -> Duration {
        if retryable {
            self.backoff(attempt)
        } else {
            self.max_backoff
        }
    }
}

/// Where the connection currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// First connection attempt in progress.
    Connecting,
    /// Frames are flowing over the given transport.
    Connected(TransportKind),
    /// Waiting to retry after a lost connection or failed attempt.
    Reconnecting { attempt: u32 },
    /// Shut down; no further attempts.
    Closed,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected(_))
    }
}

/// Unique identifier for one client connection, for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct ClientInner {
    user_id: UserId,
    client_id: ClientId,
    registry: Arc<HandlerRegistry>,
    outbound: mpsc::Sender<TransportFrame>,
    state: watch::Receiver<ConnectionState>,
    shutdown: watch::Sender<bool>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        tracing::debug!(
            user_id = %self.user_id,
            client_id = %self.client_id,
            "Last realtime handle dropped, closing connection"
        );
    }
}

/// Shared handle to a user's realtime connection.
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<ClientInner>,
}

/// Non-owning handle; does not keep the connection alive.
#[derive(Clone)]
pub struct WeakRealtimeClient {
    inner: Weak<ClientInner>,
}

impl WeakRealtimeClient {
    pub fn upgrade(&self) -> Option<RealtimeClient> {
        self.inner.upgrade().map(|inner| RealtimeClient { inner })
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl RealtimeClient {
    /// Starts connecting on the current tokio runtime.
    ///
    /// Returns immediately; use `connected` or `state_changes` to follow
    /// progress.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if `transports` is empty
    /// - `Unavailable` if called outside a tokio runtime
    pub fn connect(
        user_id: UserId,
        transports: Vec<Arc<dyn Transport>>,
        options: ClientOptions,
    ) -> Result<Self, TransportError> {
        if transports.is_empty() {
            return Err(TransportError::InvalidConfig(
                "at least one transport is required".to_string(),
            ));
        }
        let runtime = Handle::try_current()
            .map_err(|e| TransportError::unavailable(format!("no async runtime: {}", e)))?;

        let client_id = ClientId::new();
        let registry = Arc::new(HandlerRegistry::new());
        let (outbound_tx, outbound_rx) = mpsc::channel(options.outbound_queue.max(1));
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let active = Arc::new(AtomicUsize::new(0));

        tracing::info!(
            user_id = %user_id,
            client_id = %client_id,
            transports = ?transports.iter().map(|t| t.kind()).collect::<Vec<_>>(),
            "Starting realtime connection"
        );

        let connection = ConnectionTask {
            user_id: user_id.clone(),
            client_id,
            transports: transports.clone(),
            registry: registry.clone(),
            active: active.clone(),
            state: state_tx,
            options,
        };
        let sender = SenderTask {
            user_id: user_id.clone(),
            transports,
            active,
            outbound: outbound_rx,
            state: state_rx.clone(),
        };
        runtime.spawn(connection.run(shutdown_rx));
        runtime.spawn(sender.run());

        Ok(Self {
            inner: Arc::new(ClientInner {
                user_id,
                client_id,
                registry,
                outbound: outbound_tx,
                state: state_rx,
                shutdown: shutdown_tx,
            }),
        })
    }

    /// Registers a handler for inbound chat messages.
    pub fn subscribe(&self, handler: Arc<dyn MessageHandler>) -> Subscription {
        let name = handler.name();
        let id = self.inner.registry.add(handler);
        tracing::debug!(
            user_id = %self.inner.user_id,
            subscription_id = %id,
            handler = name,
            "Handler subscribed"
        );
        Subscription::new(id, &self.inner.registry)
    }

    /// Queues a notification request for the server. Never blocks.
    pub fn emit_notification_request(&self, request: &NotificationRequest) {
        let frame = encode_notification_request(request);
        match self.inner.outbound.try_send(frame) {
            Ok(()) => tracing::debug!(
                user_id = %self.inner.user_id,
                recipient_id = %request.recipient_id(),
                kind = request.kind(),
                "Notification request queued"
            ),
            Err(TrySendError::Full(_)) => tracing::warn!(
                user_id = %self.inner.user_id,
                recipient_id = %request.recipient_id(),
                "Outbound queue full, dropping notification request"
            ),
            Err(TrySendError::Closed(_)) => tracing::warn!(
                user_id = %self.inner.user_id,
                recipient_id = %request.recipient_id(),
                "Connection closed, dropping notification request"
            ),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Receiver that observes every state change.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.clone()
    }

    /// Waits until connected and returns the transport in use.
    ///
    /// Returns `None` if the connection closed first. Keeps waiting while
    /// the client is still retrying.
    pub async fn connected(&self) -> Option<TransportKind> {
        let mut state = self.inner.state.clone();
        let current = match state
            .wait_for(|s| matches!(s, ConnectionState::Connected(_) | ConnectionState::Closed))
            .await
        {
            Ok(current) => *current,
            Err(_) => return None,
        };
        match current {
            ConnectionState::Connected(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.inner.user_id
    }

    pub fn client_id(&self) -> ClientId {
        self.inner.client_id
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Number of live handles sharing this connection.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub fn downgrade(&self) -> WeakRealtimeClient {
        WeakRealtimeClient {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl NotificationEmitter for RealtimeClient {
    fn emit_notification_request(&self, request: NotificationRequest) {
        RealtimeClient::emit_notification_request(self, &request)
    }
}

impl fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("user_id", &self.inner.user_id)
            .field("client_id", &self.inner.client_id)
            .field("state", &self.state())
            .finish()
    }
}

// ───────────────────────────────────────────────────────────────
// Connection task
// ───────────────────────────────────────────────────────────────

enum Opened {
    Ready(usize, TransportKind, FrameStream),
    /// Every transport failed; `retryable` is false only if none can recover.
    Failed { retryable: bool },
}

enum PumpExit {
    Lost { retryable: bool },
    Shutdown,
}

struct ConnectionTask {
    user_id: UserId,
    client_id: ClientId,
    transports: Vec<Arc<dyn Transport>>,
    registry: Arc<HandlerRegistry>,
    active: Arc<AtomicUsize>,
    state: watch::Sender<ConnectionState>,
    options: ClientOptions,
}

impl ConnectionTask {
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut attempt: u32 = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let opened = tokio::select! {
                _ = shutdown.changed() => break,
                opened = self.open_preferred() => opened,
            };

            let retryable = match opened {
                Opened::Failed { retryable } => retryable,
                Opened::Ready(index, kind, frames) => {
                    self.active.store(index, Ordering::SeqCst);
                    let _ = self.state.send(ConnectionState::Connected(kind));
                    tracing::info!(
                        user_id = %self.user_id,
                        client_id = %self.client_id,
                        transport = %kind,
                        "Realtime connection established"
                    );
                    attempt = 0;

                    match self.pump(frames, &mut shutdown).await {
                        PumpExit::Shutdown => break,
                        PumpExit::Lost { retryable } => {
                            tracing::warn!(
                                user_id = %self.user_id,
                                client_id = %self.client_id,
                                transport = %kind,
                                "Realtime connection lost"
                            );
                            retryable
                        }
                    }
                }
            };

            attempt = attempt.saturating_add(1);
            let delay = self.options.retry_delay(attempt, retryable);
            let _ = self.state.send(ConnectionState::Reconnecting { attempt });
            tracing::debug!(
                user_id = %self.user_id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Waiting before reconnect"
            );

            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        let _ = self.state.send(ConnectionState::Closed);
        tracing::info!(
            user_id = %self.user_id,
            client_id = %self.client_id,
            "Realtime connection closed"
        );
    }

    /// Opens the first transport that succeeds, in preference order.
    async fn open_preferred(&self) -> Opened {
        let mut retryable = false;
        for (index, transport) in self.transports.iter().enumerate() {
            let kind = transport.kind();
            match transport.open().await {
                Ok(frames) => return Opened::Ready(index, kind, frames),
                Err(e) if e.is_retryable() => {
                    retryable = true;
                    tracing::warn!(
                        user_id = %self.user_id,
                        transport = %kind,
                        error = %e,
                        "Transport failed to open"
                    );
                }
                Err(e) => tracing::error!(
                    user_id = %self.user_id,
                    transport = %kind,
                    error = %e,
                    "Transport refused connection"
                ),
            }
        }
        tracing::warn!(user_id = %self.user_id, retryable, "No transport could be opened");
        Opened::Failed { retryable }
    }

    async fn pump(
        &self,
        mut frames: FrameStream,
        shutdown: &mut watch::Receiver<bool>,
    ) -> PumpExit {
        loop {
            tokio::select! {
                _ = shutdown.changed() => return PumpExit::Shutdown,
                item = frames.next() => match item {
                    Some(Ok(frame)) => self.handle_frame(&frame),
                    Some(Err(TransportError::Decode(reason))) => tracing::warn!(
                        user_id = %self.user_id,
                        reason = %reason,
                        "Skipping undecodable frame"
                    ),
                    Some(Err(e)) if e.is_retryable() => {
                        tracing::warn!(user_id = %self.user_id, error = %e, "Transport error");
                        return PumpExit::Lost { retryable: true };
                    }
                    Some(Err(e)) => {
                        tracing::error!(
                            user_id = %self.user_id,
                            error = %e,
                            "Transport refused connection"
                        );
                        return PumpExit::Lost { retryable: false };
                    }
                    None => return PumpExit::Lost { retryable: true },
                },
            }
        }
    }

    fn handle_frame(&self, frame: &TransportFrame) {
        if frame.event != MESSAGE_RECEIVED_EVENT {
            tracing::trace!(event = %frame.event, "Ignoring frame");
            return;
        }
        match decode_chat_message(frame) {
            Ok(message) => {
                let delivered = self.registry.dispatch(&message);
                tracing::debug!(
                    user_id = %self.user_id,
                    message_id = %message.id,
                    handlers = delivered,
                    "Message delivered"
                );
            }
            Err(e) => tracing::warn!(
                user_id = %self.user_id,
                field = e.field(),
                error = %e,
                "Skipping malformed message"
            ),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Sender task
// ───────────────────────────────────────────────────────────────

struct SenderTask {
    user_id: UserId,
    transports: Vec<Arc<dyn Transport>>,
    active: Arc<AtomicUsize>,
    outbound: mpsc::Receiver<TransportFrame>,
    state: watch::Receiver<ConnectionState>,
}

impl SenderTask {
    async fn run(mut self) {
        while let Some(frame) = self.outbound.recv().await {
            // Frames queued while disconnected wait for the next connection.
            let ready = match self
                .state
                .wait_for(|s| matches!(s, ConnectionState::Connected(_) | ConnectionState::Closed))
                .await
            {
                Ok(state) => state.is_connected(),
                Err(_) => false,
            };
            if !ready {
                break;
            }

            let index = self.active.load(Ordering::SeqCst);
            let Some(transport) = self.transports.get(index) else {
                continue;
            };
            if let Err(e) = transport.send(frame.clone()).await {
                tracing::warn!(
                    user_id = %self.user_id,
                    transport = %transport.kind(),
                    event = %frame.event,
                    error = %e,
                    "Failed to send frame"
                );
            }
        }
        tracing::debug!(user_id = %self.user_id, "Sender stopped");
    }
}
