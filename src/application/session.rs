//! NotificationSession - binds the current user, their feed and connection.
//!
//! The session is created from an explicit `User` rather than ambient
//! login state. Switching users drops the old subscription and connection
//! handle before the feed is reset, so no message for the previous user
//! can land in the new user's feed.

use std::sync::Arc;

use crate::adapters::realtime::{ConnectionManager, ConnectionState, RealtimeClient, Subscription};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::user::User;
use crate::ports::{MessageHandler, NotificationEmitter, TransportError};

use super::feed::NotificationFeed;

pub struct NotificationSession {
    user: User,
    feed: NotificationFeed,
    client: RealtimeClient,
    subscription: Option<Subscription>,
}

impl NotificationSession {
    /// Acquires the user's connection and starts feeding notifications.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if capacity is zero
    /// - `TransportUnavailable` if no connection can be set up
    pub fn start(
        user: User,
        connections: &ConnectionManager,
        capacity: usize,
    ) -> Result<Self, DomainError> {
        let feed = NotificationFeed::new(user.id().clone(), capacity)?;
        let client = connections.acquire(user.id()).map_err(transport_error)?;
        let subscription = client.subscribe(Arc::new(feed.clone()) as Arc<dyn MessageHandler>);

        tracing::info!(user_id = %user.id(), name = %user.display_name(), "Notification session started");

        Ok(Self {
            user,
            feed,
            client,
            subscription: Some(subscription),
        })
    }

    /// Rebinds the session to another user.
    ///
    /// # Errors
    ///
    /// - `TransportUnavailable` if the new user's connection cannot be set
    ///   up; the session is then left on the old user
    pub fn switch_user(
        &mut self,
        user: User,
        connections: &ConnectionManager,
    ) -> Result<(), DomainError> {
        if user.is(self.user.id()) {
            return Ok(());
        }
        let client = connections.acquire(user.id()).map_err(transport_error)?;

        // Old handler must be gone before the feed changes owner.
        if let Some(previous) = self.subscription.take() {
            previous.unsubscribe();
        }
        self.feed.reset(user.id().clone());
        self.subscription =
            Some(client.subscribe(Arc::new(self.feed.clone()) as Arc<dyn MessageHandler>));
        self.client = client;

        tracing::info!(user_id = %user.id(), previous = %self.user.id(), "Notification session switched user");
        self.user = user;
        Ok(())
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn feed(&self) -> &NotificationFeed {
        &self.feed
    }

    pub fn client(&self) -> &RealtimeClient {
        &self.client
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.client.state()
    }

    /// Emitter bound to this session's connection.
    pub fn emitter(&self) -> Arc<dyn NotificationEmitter> {
        Arc::new(self.client.clone())
    }
}

fn transport_error(err: TransportError) -> DomainError {
    DomainError::new(ErrorCode::TransportUnavailable, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::realtime::{ClientOptions, InMemoryTransportFactory};
    use crate::domain::foundation::UserId;
    use crate::ports::{TransportFrame, MESSAGE_RECEIVED_EVENT};
    use serde_json::json;
    use std::time::Duration;

    fn message_frame(id: &str, sender: &str) -> TransportFrame {
        TransportFrame::new(
            MESSAGE_RECEIVED_EVENT,
            json!({
                "id": id,
                "sender": { "id": sender, "name": "Rita Recruiter" },
                "content": "Interview on Monday?",
                "channelId": "chan-1",
                "createdAt": "2024-05-02T09:15:00Z"
            }),
        )
    }

    fn user(id: &str) -> User {
        User::new(UserId::new(id).unwrap())
    }

    fn setup() -> (Arc<InMemoryTransportFactory>, ConnectionManager) {
        let factory = Arc::new(InMemoryTransportFactory::new());
        let manager = ConnectionManager::new(factory.clone(), ClientOptions::default());
        (factory, manager)
    }

    async fn wait_for_unread(feed: &NotificationFeed, expected: usize) {
        let mut rx = feed.subscribe();
        tokio::time::timeout(
            Duration::from_secs(2),
            rx.wait_for(|snapshot| snapshot.unread_count == expected),
        )
        .await
        .expect("feed did not reach expected unread count")
        .unwrap();
    }

    #[tokio::test]
    async fn delivered_messages_reach_the_feed() {
        let (factory, manager) = setup();
        let session = NotificationSession::start(user("candidate-1"), &manager, 20).unwrap();
        session.client().connected().await.unwrap();

        let transport = &factory.transports_for(&UserId::new("candidate-1").unwrap())[0];
        assert!(transport.deliver(message_frame("m1", "recruiter-1")));

        wait_for_unread(session.feed(), 1).await;
        assert_eq!(session.feed().snapshot().notifications[0].id().as_str(), "m1");
    }

    #[tokio::test]
    async fn zero_capacity_fails_to_start() {
        let (_, manager) = setup();
        let err = NotificationSession::start(user("candidate-1"), &manager, 0)
            .err()
            .unwrap();
        assert_eq!(err.code, ErrorCode::OutOfRange);
    }

    #[tokio::test]
    async fn switch_user_resets_feed_and_releases_old_connection() {
        let (factory, manager) = setup();
        let mut session = NotificationSession::start(user("alice"), &manager, 20).unwrap();
        session.client().connected().await.unwrap();

        let alice_transport = factory.transports_for(&UserId::new("alice").unwrap())[0].clone();
        alice_transport.deliver(message_frame("m1", "recruiter-1"));
        wait_for_unread(session.feed(), 1).await;

        session.switch_user(user("bob"), &manager).unwrap();

        assert_eq!(session.user().id().as_str(), "bob");
        assert!(session.feed().snapshot().is_empty());
        assert_eq!(session.feed().owner().as_str(), "bob");
        assert_eq!(manager.active_connections(), 1);

        session.client().connected().await.unwrap();
        let bob_transport = factory.transports_for(&UserId::new("bob").unwrap())[0].clone();
        bob_transport.deliver(message_frame("m2", "recruiter-2"));
        wait_for_unread(session.feed(), 1).await;
        assert!(!session.feed().contains(&crate::domain::foundation::MessageId::new("m1").unwrap()));
    }

    #[tokio::test]
    async fn switching_to_same_user_is_a_no_op() {
        let (factory, manager) = setup();
        let mut session = NotificationSession::start(user("alice"), &manager, 20).unwrap();

        session.switch_user(user("alice"), &manager).unwrap();

        assert_eq!(factory.create_count(), 1);
        assert_eq!(session.client().subscriber_count(), 1);
    }
}
