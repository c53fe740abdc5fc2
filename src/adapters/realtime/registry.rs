//! Handler registry for inbound chat messages.
//!
//! Each `subscribe` gets a `SubscriptionId`; the returned `Subscription`
//! removes its handler when dropped or explicitly unsubscribed.
//!
//! # Thread Safety
//!
//! Dispatch copies the handler list and releases the registry lock before
//! calling anything, so a handler may unsubscribe itself (or others) from
//! inside `on_message`. Each entry has a call lock held around its handler:
//! `remove` marks the entry inactive and then waits on that lock, so once
//! `unsubscribe` returns the handler is never invoked again, not even by a
//! dispatch already in flight on another thread. Removing an entry from
//! inside its own handler does not wait; the running call is the last one.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::thread::{self, ThreadId};

use uuid::Uuid;

use crate::domain::notification::ChatMessage;
use crate::ports::MessageHandler;

/// Identifies one registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Entry {
    id: SubscriptionId,
    handler: Arc<dyn MessageHandler>,
    active: AtomicBool,
    /// Held for the duration of each handler call.
    call: Mutex<()>,
    /// Thread currently inside the handler, if any.
    caller: Mutex<Option<ThreadId>>,
}

impl Entry {
    fn invoke(&self, message: &ChatMessage) -> bool {
        let _call = self.call.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.active.load(Ordering::SeqCst) {
            return false;
        }
        self.set_caller(Some(thread::current().id()));
        tracing::trace!(
            subscription_id = %self.id,
            handler = self.handler.name(),
            message_id = %message.id,
            "Dispatching message"
        );
        self.handler.on_message(message);
        self.set_caller(None);
        true
    }

    fn set_caller(&self, caller: Option<ThreadId>) {
        *self.caller.lock().unwrap_or_else(PoisonError::into_inner) = caller;
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        let current = thread::current().id();
        let reentrant =
            *self.caller.lock().unwrap_or_else(PoisonError::into_inner) == Some(current);
        if !reentrant {
            // Wait out a call in progress on another thread.
            drop(self.call.lock().unwrap_or_else(PoisonError::into_inner));
        }
    }
}

/// Ordered set of message handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: RwLock<Vec<Arc<Entry>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, handler: Arc<dyn MessageHandler>) -> SubscriptionId {
        let id = SubscriptionId::new();
        let entry = Entry {
            id,
            handler,
            active: AtomicBool::new(true),
            call: Mutex::new(()),
            caller: Mutex::new(None),
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(entry));
        id
    }

    /// Removes a handler. Returns `false` if it was already gone.
    ///
    /// Blocks while the handler is running on another thread.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let removed = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let position = entries.iter().position(|e| e.id == id);
            position.map(|i| entries.remove(i))
        };
        match removed {
            Some(entry) => {
                entry.deactivate();
                true
            }
            None => false,
        }
    }

    /// Invokes every handler with the message, in registration order.
    ///
    /// Returns how many handlers were invoked.
    pub fn dispatch(&self, message: &ChatMessage) -> usize {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        entries.iter().filter(|entry| entry.invoke(message)).count()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle to a registered handler.
///
/// Dropping it unsubscribes. Call `detach` to keep the handler registered
/// for the lifetime of the connection.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<HandlerRegistry>,
    active: bool,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, registry: &Arc<HandlerRegistry>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
            active: true,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the handler. It is not invoked for any later message.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Leaves the handler registered and forgets the handle.
    pub fn detach(mut self) {
        self.active = false;
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.id) {
                tracing::debug!(subscription_id = %self.id, "Handler unsubscribed");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}
