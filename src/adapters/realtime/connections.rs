//! Connection manager - one shared realtime connection per user.
//!
//! Every component that needs a user's messages acquires the same
//! `RealtimeClient`. The manager only keeps weak handles, so the
//! connection closes as soon as the last component lets go of it and the
//! next `acquire` opens a fresh one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::foundation::UserId;
use crate::ports::{TransportError, TransportFactory};

use super::client::{ClientOptions, RealtimeClient, WeakRealtimeClient};

pub struct ConnectionManager {
    factory: Arc<dyn TransportFactory>,
    options: ClientOptions,
    clients: Mutex<HashMap<UserId, WeakRealtimeClient>>,
}

impl ConnectionManager {
    pub fn new(factory: Arc<dyn TransportFactory>, options: ClientOptions) -> Self {
        Self {
            factory,
            options,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the user's live connection, opening one if needed.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns whatever the transport factory or `RealtimeClient::connect`
    /// reports.
    pub fn acquire(&self, user_id: &UserId) -> Result<RealtimeClient, TransportError> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        clients.retain(|_, client| client.is_alive());

        if let Some(client) = clients.get(user_id).and_then(WeakRealtimeClient::upgrade) {
            tracing::debug!(user_id = %user_id, client_id = %client.client_id(), "Reusing realtime connection");
            return Ok(client);
        }

        let transports = self.factory.create(user_id)?;
        let client = RealtimeClient::connect(user_id.clone(), transports, self.options.clone())?;
        clients.insert(user_id.clone(), client.downgrade());
        Ok(client)
    }

    /// Number of users with a live connection.
    pub fn active_connections(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|client| client.is_alive())
            .count()
    }
}
