//! Strongly-typed identifier value objects.
//!
//! Identifiers here are issued upstream (identity provider, chat backend)
//! and arrive as opaque strings. They are never generated locally.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// User identifier (from the identity provider).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a chat message, assigned by the messaging backend.
///
/// Notifications reuse the id of the message they were built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Creates a new MessageId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a conversation (chat channel).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Creates a new ChannelId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("channel_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_empty() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("   ").is_err());
    }

    #[test]
    fn user_id_accepts_opaque_strings() {
        let id = UserId::new("auth0|64f1c2").unwrap();
        assert_eq!(id.as_str(), "auth0|64f1c2");
        assert_eq!(id.to_string(), "auth0|64f1c2");
    }

    #[test]
    fn message_id_rejects_empty_with_field_name() {
        let err = MessageId::new("").unwrap_err();
        assert_eq!(err.to_string(), "id is required but was empty");
    }

    #[test]
    fn channel_id_serializes_transparently() {
        let id = ChannelId::new("chan-42").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"chan-42\"");

        let back: ChannelId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ids_compare_by_value() {
        assert_eq!(UserId::new("u1").unwrap(), UserId::new("u1").unwrap());
        assert_ne!(UserId::new("u1").unwrap(), UserId::new("u2").unwrap());
    }
}
