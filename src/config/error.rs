//! Failures while loading or validating `AppConfig`.

use thiserror::Error;

/// Top-level error returned by `AppConfig::load`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A loaded value that cannot be used as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing setting: JOB_NOTIFY__{0}")]
    MissingRequired(&'static str),

    #[error("Realtime endpoint must be an http(s) URL")]
    InvalidEndpoint,

    #[error("Realtime path must start with '/'")]
    InvalidPath,

    #[error("Unknown transport: {0}")]
    UnknownTransport(String),

    #[error("At least one transport must be enabled")]
    NoTransports,

    #[error("Transport listed more than once: {0}")]
    DuplicateTransport(String),

    #[error("Request timeout must be positive")]
    InvalidTimeout,

    #[error("Poll interval must be positive")]
    InvalidPollInterval,

    #[error("Reconnect backoff must be positive and base must not exceed max")]
    InvalidBackoff,

    #[error("Outbound queue must hold at least one frame")]
    InvalidOutboundQueue,

    #[error("Feed capacity must be between 1 and 1000")]
    InvalidCapacity,

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
