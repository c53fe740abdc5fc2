//! In-memory transport for testing.
//!
//! Frames are injected with `deliver` and sent frames are captured for
//! assertions. Each `open` starts a fresh connection; opening again or
//! calling `disconnect` ends the previous stream, which is how tests
//! simulate a dropped connection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::stream;
use tokio::sync::mpsc;

use crate::domain::foundation::UserId;
use crate::ports::{
    FrameStream, Transport, TransportError, TransportFactory, TransportFrame, TransportKind,
};

/// In-memory transport.
///
/// Features:
/// - Frame injection into the current connection
/// - Outbound frame capture
/// - Switchable open and send failures, with a chosen open error
pub struct InMemoryTransport {
    kind: TransportKind,
    inbound: Mutex<Option<mpsc::UnboundedSender<Result<TransportFrame, TransportError>>>>,
    sent: Mutex<Vec<TransportFrame>>,
    open_error: Mutex<Option<TransportError>>,
    fail_send: AtomicBool,
    attempts: AtomicUsize,
    opens: AtomicUsize,
}

impl InMemoryTransport {
    pub fn new(kind: TransportKind) -> Self {
        Self {
            kind,
            inbound: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            open_error: Mutex::new(None),
            fail_send: AtomicBool::new(false),
            attempts: AtomicUsize::new(0),
            opens: AtomicUsize::new(0),
        }
    }

    /// Creates a transport whose `open` fails until told otherwise.
    pub fn unreachable(kind: TransportKind) -> Self {
        let transport = Self::new(kind);
        transport.set_fail_open(true);
        transport
    }

    // === Test Helpers ===

    /// Pushes a frame into the open connection.
    ///
    /// Returns `false` if no connection is open.
    pub fn deliver(&self, frame: TransportFrame) -> bool {
        self.push(Ok(frame))
    }

    /// Pushes a connection-level error into the open connection.
    pub fn deliver_error(&self, error: TransportError) -> bool {
        self.push(Err(error))
    }

    fn push(&self, item: Result<TransportFrame, TransportError>) -> bool {
        let inbound = self.inbound.lock().unwrap_or_else(PoisonError::into_inner);
        match inbound.as_ref() {
            Some(tx) => tx.send(item).is_ok(),
            None => false,
        }
    }

    /// Ends the current connection's stream.
    pub fn disconnect(&self) {
        self.inbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Whether a consumer is still reading the current connection.
    pub fn is_open(&self) -> bool {
        self.inbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
    }

    pub fn set_fail_open(&self, fail: bool) {
        let error = fail.then(|| {
            TransportError::unavailable(format!("{} transport unreachable", self.kind))
        });
        self.fail_open_with(error);
    }

    /// Makes every `open` fail with `error`, or succeed again with `None`.
    pub fn fail_open_with(&self, error: Option<TransportError>) {
        *self.open_error.lock().unwrap_or_else(PoisonError::into_inner) = error;
    }

    pub fn set_fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    /// Number of `open` calls, failed ones included.
    pub fn open_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Number of successful opens so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Frames sent through this transport.
    pub fn sent_frames(&self) -> Vec<TransportFrame> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    async fn open(&self) -> Result<FrameStream, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let error = self
            .open_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(error) = error {
            return Err(error);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        *self.inbound.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        self.opens.fetch_add(1, Ordering::SeqCst);

        let frames = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(Box::pin(frames))
    }

    async fn send(&self, frame: TransportFrame) -> Result<(), TransportError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(TransportError::network("simulated send failure"));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame);
        Ok(())
    }
}

/// Factory handing out in-memory transports per user.
///
/// Users without registered transports get a single streaming transport,
/// created on first use and kept for later inspection.
#[derive(Default)]
pub struct InMemoryTransportFactory {
    transports: Mutex<HashMap<UserId, Vec<Arc<InMemoryTransport>>>>,
    created: AtomicUsize,
}

impl InMemoryTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transports (in preference order) used for `user_id`.
    pub fn register(&self, user_id: &UserId, transports: Vec<Arc<InMemoryTransport>>) {
        self.transports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.clone(), transports);
    }

    /// Transports handed out for `user_id`, creating the default if needed.
    pub fn transports_for(&self, user_id: &UserId) -> Vec<Arc<InMemoryTransport>> {
        self.transports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user_id.clone())
            .or_insert_with(|| vec![Arc::new(InMemoryTransport::new(TransportKind::Streaming))])
            .clone()
    }

    /// Number of times `create` was called.
    pub fn create_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl TransportFactory for InMemoryTransportFactory {
    fn create(&self, user_id: &UserId) -> Result<Vec<Arc<dyn Transport>>, TransportError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .transports_for(user_id)
            .into_iter()
            .map(|t| t as Arc<dyn Transport>)
            .collect())
    }
}
