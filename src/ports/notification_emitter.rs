//! NotificationEmitter port - fire-and-forget outbound requests.

use crate::domain::notification::NotificationRequest;

/// Port for asking the server to notify another user.
///
/// Emission never reports back: queueing or delivery failures are logged
/// by the implementation and dropped.
pub trait NotificationEmitter: Send + Sync {
    fn emit_notification_request(&self, request: NotificationRequest);
}
