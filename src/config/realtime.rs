//! Realtime connection configuration

use serde::Deserialize;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

use crate::adapters::realtime::{ClientOptions, HttpTransportConfig, DEFAULT_REALTIME_PATH};
use crate::ports::TransportKind;

use super::error::ValidationError;

/// Realtime connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Base URL of the messaging service
    pub endpoint: String,

    /// Sub-path of the realtime routes
    #[serde(default = "default_path")]
    pub path: String,

    /// Transports in preference order (comma-separated)
    #[serde(default = "default_transports")]
    pub transports: String,

    /// Attach credentials to realtime requests
    #[serde(default = "default_with_credentials")]
    pub with_credentials: bool,

    /// Bearer token for the messaging service
    pub auth_token: Option<Secret<String>>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Pause between empty polls in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// First reconnect delay in milliseconds
    #[serde(default = "default_reconnect_base")]
    pub reconnect_base_ms: u64,

    /// Reconnect delay cap in seconds
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,

    /// Outbound frames buffered before dropping
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

impl RealtimeConfig {
    /// Creates a configuration with defaults for everything but the endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            path: default_path(),
            transports: default_transports(),
            with_credentials: default_with_credentials(),
            auth_token: None,
            request_timeout_secs: default_request_timeout(),
            poll_interval_ms: default_poll_interval(),
            reconnect_base_ms: default_reconnect_base(),
            max_backoff_secs: default_max_backoff(),
            outbound_queue: default_outbound_queue(),
        }
    }

    /// Parse the transport list
    pub fn transport_kinds(&self) -> Result<Vec<TransportKind>, ValidationError> {
        let mut kinds = Vec::new();
        for name in self.transports.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let kind: TransportKind = name
                .parse()
                .map_err(|_| ValidationError::UnknownTransport(name.to_string()))?;
            if kinds.contains(&kind) {
                return Err(ValidationError::DuplicateTransport(name.to_string()));
            }
            kinds.push(kind);
        }
        if kinds.is_empty() {
            return Err(ValidationError::NoTransports);
        }
        Ok(kinds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Settings for the HTTP transports
    pub fn transport_config(&self) -> HttpTransportConfig {
        let config = HttpTransportConfig::new(self.endpoint.clone())
            .with_path(self.path.clone())
            .with_credentials(self.with_credentials)
            .with_request_timeout(self.request_timeout())
            .with_poll_interval(self.poll_interval());
        match &self.auth_token {
            Some(token) => config.with_auth_token(token.expose_secret().clone()),
            None => config,
        }
    }

    /// Reconnect and queue settings for the realtime client
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions::default()
            .with_reconnect_base(Duration::from_millis(self.reconnect_base_ms))
            .with_max_backoff(Duration::from_secs(self.max_backoff_secs))
            .with_outbound_queue(self.outbound_queue)
    }

    /// Validate realtime configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.endpoint.trim().is_empty() {
            return Err(ValidationError::MissingRequired("REALTIME__ENDPOINT"));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ValidationError::InvalidEndpoint);
        }
        if !self.path.is_empty() && !self.path.starts_with('/') {
            return Err(ValidationError::InvalidPath);
        }
        self.transport_kinds()?;
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.poll_interval_ms == 0 {
            return Err(ValidationError::InvalidPollInterval);
        }
        if self.reconnect_base_ms == 0
            || self.max_backoff_secs == 0
            || self.reconnect_base_ms > self.max_backoff_secs.saturating_mul(1000)
        {
            return Err(ValidationError::InvalidBackoff);
        }
        if self.outbound_queue == 0 {
            return Err(ValidationError::InvalidOutboundQueue);
        }
        Ok(())
    }
}

fn default_path() -> String {
    DEFAULT_REALTIME_PATH.to_string()
}

fn default_transports() -> String {
    "streaming,polling".to_string()
}

fn default_with_credentials() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_reconnect_base() -> u64 {
    500
}

fn default_max_backoff() -> u64 {
    30
}

fn default_outbound_queue() -> usize {
    64
}
