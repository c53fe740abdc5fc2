//! Route-based navigator.
//!
//! The host router is outside this crate. `ChatRouteNavigator` resolves the
//! chat route for a channel, hands it to an optional sink (the host's
//! router callback) and keeps the history so callers can inspect where the
//! user was sent.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::foundation::{ChannelId, DomainError};
use crate::ports::{chat_route, Navigator};

type RouteSink = Box<dyn Fn(&str) -> Result<(), DomainError> + Send + Sync>;

#[derive(Default)]
pub struct ChatRouteNavigator {
    sink: Option<RouteSink>,
    history: Mutex<Vec<String>>,
}

impl ChatRouteNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forwards every resolved route to `sink`.
    pub fn with_sink<F>(sink: F) -> Self
    where
        F: Fn(&str) -> Result<(), DomainError> + Send + Sync + 'static,
    {
        Self {
            sink: Some(Box::new(sink)),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_route(&self) -> Option<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

#[async_trait]
impl Navigator for ChatRouteNavigator {
    async fn open_chat(&self, channel_id: &ChannelId) -> Result<(), DomainError> {
        let route = chat_route(channel_id);
        if let Some(sink) = &self.sink {
            sink(&route)?;
        }
        tracing::info!(channel_id = %channel_id, route = %route, "Navigating to chat");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
        Ok(())
    }
}
