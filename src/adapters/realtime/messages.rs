//! Wire payloads carried inside transport frames.
//!
//! - Server → Client: `receiveMessage` with a chat message
//! - Client → Server: `sendNotification` with a notification request
//!
//! Inbound payloads are decoded leniently (every field optional) and then
//! validated, so a malformed message is reported as a `ValidationError`
//! naming the missing field instead of a serde error.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChannelId, MessageId, Timestamp, UserId, ValidationError};
use crate::domain::notification::{ChatMessage, NotificationRequest};
use crate::domain::user::User;
use crate::ports::{TransportFrame, NOTIFICATION_REQUEST_EVENT};

// ============================================
// Server → Client
// ============================================

/// Payload of a `receiveMessage` event.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReceivedPayload {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub sender: Option<SenderPayload>,
    pub content: Option<String>,
    pub channel_id: Option<String>,
    pub created_at: Option<String>,
}

/// Sender as embedded in a chat message.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderPayload {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "picture")]
    pub profile_picture: Option<String>,
    #[serde(alias = "given_name")]
    pub given_name: Option<String>,
    #[serde(alias = "family_name")]
    pub family_name: Option<String>,
    pub email: Option<String>,
}

impl TryFrom<MessageReceivedPayload> for ChatMessage {
    type Error = ValidationError;

    fn try_from(payload: MessageReceivedPayload) -> Result<Self, Self::Error> {
        let id = MessageId::new(required("id", payload.id)?)?;
        let sender = payload
            .sender
            .ok_or_else(|| ValidationError::empty_field("sender"))?;
        let sender = User::try_from(sender)?;
        let content = payload
            .content
            .ok_or_else(|| ValidationError::empty_field("content"))?;
        let channel_id = ChannelId::new(required("channelId", payload.channel_id)?)?;
        let created_at =
            Timestamp::parse_rfc3339("createdAt", &required("createdAt", payload.created_at)?)?;

        Ok(ChatMessage::new(id, sender, content, channel_id, created_at))
    }
}

impl TryFrom<SenderPayload> for User {
    type Error = ValidationError;

    fn try_from(payload: SenderPayload) -> Result<Self, Self::Error> {
        let id = payload
            .id
            .ok_or_else(|| ValidationError::empty_field("sender.id"))?;
        let id = UserId::new(id).map_err(|_| ValidationError::empty_field("sender.id"))?;

        let mut user = User::new(id).with_full_name(payload.given_name, payload.family_name);
        if let Some(name) = payload.name {
            user = user.with_name(name);
        }
        if let Some(picture) = payload.profile_picture {
            user = user.with_profile_picture(picture);
        }
        if let Some(email) = payload.email {
            user = user.with_email(email);
        }
        Ok(user)
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::empty_field(field)),
    }
}

/// Decodes the data of a `receiveMessage` frame into a validated message.
pub fn decode_chat_message(frame: &TransportFrame) -> Result<ChatMessage, ValidationError> {
    let payload: MessageReceivedPayload = serde_json::from_value(frame.data.clone())
        .map_err(|e| ValidationError::invalid_format("data", e.to_string()))?;
    ChatMessage::try_from(payload)
}

// ============================================
// Client → Server
// ============================================

/// Payload of a `sendNotification` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequestPayload {
    pub recipient_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl From<&NotificationRequest> for NotificationRequestPayload {
    fn from(request: &NotificationRequest) -> Self {
        Self {
            recipient_id: request.recipient_id().to_string(),
            kind: request.kind().to_string(),
            message: request.message().to_string(),
        }
    }
}

/// Wraps a notification request into its outbound frame.
pub fn encode_notification_request(request: &NotificationRequest) -> TransportFrame {
    let payload = NotificationRequestPayload::from(request);
    let data = serde_json::json!({
        "recipientId": payload.recipient_id,
        "type": payload.kind,
        "message": payload.message,
    });
    TransportFrame::new(NOTIFICATION_REQUEST_EVENT, data)
}
