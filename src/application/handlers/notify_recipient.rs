//! NotifyRecipientHandler - Command handler for notifying another user.
//!
//! Used by recruiter-side actions (shortlisting, rejecting a candidate).
//! Validation happens here; delivery is fire-and-forget.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId, ValidationError};
use crate::domain::notification::NotificationRequest;
use crate::ports::NotificationEmitter;

/// Command to notify a user.
#[derive(Debug, Clone)]
pub struct NotifyRecipientCommand {
    pub recipient_id: String,
    pub kind: String,
    pub message: String,
}

pub struct NotifyRecipientHandler {
    emitter: Arc<dyn NotificationEmitter>,
}

impl NotifyRecipientHandler {
    pub fn new(emitter: Arc<dyn NotificationEmitter>) -> Self {
        Self { emitter }
    }

    /// Validates the request and hands it to the emitter.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if recipient, type or message is blank
    pub fn handle(&self, cmd: NotifyRecipientCommand) -> Result<NotificationRequest, DomainError> {
        let recipient_id = UserId::new(cmd.recipient_id)
            .map_err(|_| ValidationError::empty_field("recipientId"))?;
        let request = NotificationRequest::new(recipient_id, cmd.kind, cmd.message)?;

        self.emitter.emit_notification_request(request.clone());
        Ok(request)
    }
}
