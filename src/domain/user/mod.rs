//! User module - external identity as seen by the notification feed.
//!
//! Users are owned by the identity provider. The feed only keeps value
//! snapshots taken when a message arrives, never live references.

mod snapshot;

pub use snapshot::User;
