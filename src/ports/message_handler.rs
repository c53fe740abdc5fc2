//! MessageHandler port - callback for inbound chat messages.

use crate::domain::notification::ChatMessage;

/// Handler invoked once per delivered chat message.
///
/// Handlers run on the connection task, one message at a time and in
/// delivery order, so they should be quick and must not block. A handler
/// must not drop its own `Subscription` from inside `on_message`.
pub trait MessageHandler: Send + Sync {
    fn on_message(&self, message: &ChatMessage);

    /// Handler name for logging.
    fn name(&self) -> &'static str {
        "anonymous"
    }
}

/// Adapts a closure into a `MessageHandler`.
pub struct FnHandler<F> {
    name: &'static str,
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&ChatMessage) + Send + Sync,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> MessageHandler for FnHandler<F>
where
    F: Fn(&ChatMessage) + Send + Sync,
{
    fn on_message(&self, message: &ChatMessage) {
        (self.f)(message)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ChannelId, MessageId, Timestamp, UserId};
    use crate::domain::user::User;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn MessageHandler) {}

    #[test]
    fn fn_handler_forwards_calls() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = FnHandler::new("counter", move |_: &ChatMessage| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let msg = ChatMessage::new(
            MessageId::new("m").unwrap(),
            User::new(UserId::new("u").unwrap()),
            "hi",
            ChannelId::new("c").unwrap(),
            Timestamp::now(),
        );
        handler.on_message(&msg);
        handler.on_message(&msg);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(handler.name(), "counter");
    }
}
