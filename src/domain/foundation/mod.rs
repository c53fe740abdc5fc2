//! Primitives shared across the notification domain: identifiers,
//! UTC timestamps and the error vocabulary.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ChannelId, MessageId, UserId};
pub use timestamp::Timestamp;
