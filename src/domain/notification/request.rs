//! Outbound notification request value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{UserId, ValidationError};

/// Well-known request kinds sent by the recruiter views.
pub mod kinds {
    pub const CANDIDATE_SHORTLISTED: &str = "shortlisted";
    pub const CANDIDATE_REJECTED: &str = "rejected";
    pub const NEW_MESSAGE: &str = "message";
}

/// Asks the server to notify `recipient_id` about something.
///
/// Sent fire-and-forget; nothing comes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    recipient_id: UserId,
    kind: String,
    message: String,
}

impl NotificationRequest {
    /// # Errors
    ///
    /// - `EmptyField` if `kind` or `message` is blank
    pub fn new(
        recipient_id: UserId,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let kind = kind.into();
        let message = message.into();
        if kind.trim().is_empty() {
            return Err(ValidationError::empty_field("type"));
        }
        if message.trim().is_empty() {
            return Err(ValidationError::empty_field("message"));
        }
        Ok(Self {
            recipient_id,
            kind,
            message,
        })
    }

    pub fn recipient_id(&self) -> &UserId {
        &self.recipient_id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
