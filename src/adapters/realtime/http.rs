//! Shared plumbing for the HTTP transports.
//!
//! Both transports talk to the same realtime endpoint under a fixed
//! sub-path that keeps the realtime handshake apart from ordinary API
//! traffic:
//!
//! | Route | Method | Used by |
//! |-------|--------|---------|
//! | `{endpoint}{path}/stream` | GET | streaming transport |
//! | `{endpoint}{path}/poll` | GET | polling transport |
//! | `{endpoint}{path}/emit` | POST | both, outbound frames |

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};

use crate::domain::foundation::UserId;
use crate::ports::{Transport, TransportError, TransportFactory, TransportFrame, TransportKind};

use super::polling::HttpPollingTransport;
use super::streaming::HttpStreamingTransport;

/// Default sub-path of the realtime routes.
pub const DEFAULT_REALTIME_PATH: &str = "/socket";

/// Configuration shared by the HTTP transports.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Base URL of the messaging service (e.g., https://chat.example.com).
    pub endpoint: String,
    /// Sub-path of the realtime routes.
    pub path: String,
    /// Attach credentials to every request.
    pub with_credentials: bool,
    /// Bearer token attached when `with_credentials` is on.
    auth_token: Option<Secret<String>>,
    /// Timeout for poll and emit requests, and for connecting.
    pub request_timeout: Duration,
    /// Pause between polls that returned nothing.
    pub poll_interval: Duration,
}

impl HttpTransportConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            path: DEFAULT_REALTIME_PATH.to_string(),
            with_credentials: true,
            auth_token: None,
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_credentials(mut self, enabled: bool) -> Self {
        self.with_credentials = enabled;
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(Secret::new(token.into()));
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Full URL of a realtime route, e.g. `route("stream")`.
    pub fn route(&self, name: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let path = self.path.trim_matches('/');
        if path.is_empty() {
            format!("{}/{}", base, name)
        } else {
            format!("{}/{}/{}", base, path, name)
        }
    }

    /// Attaches credentials to a request if enabled.
    pub(super) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match (&self.auth_token, self.with_credentials) {
            (Some(token), true) => request.bearer_auth(token.expose_secret()),
            _ => request,
        }
    }

    /// Builds the HTTP client.
    ///
    /// Only connecting is bounded by the client; a streaming body may stay
    /// open indefinitely, so per-request timeouts are set where needed.
    pub fn build_client(&self) -> Result<Client, TransportError> {
        Client::builder()
            .connect_timeout(self.request_timeout)
            .build()
            .map_err(|e| TransportError::InvalidConfig(format!("HTTP client: {}", e)))
    }
}

/// Maps a reqwest failure onto the transport error taxonomy.
pub(super) fn map_request_error(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            timeout_secs: timeout.as_secs(),
        }
    } else if err.is_connect() {
        TransportError::network(format!("connection failed: {}", err))
    } else if err.is_decode() {
        TransportError::decode(err.to_string())
    } else {
        TransportError::network(err.to_string())
    }
}

/// Passes successful responses through and classifies the rest.
pub(super) fn check_status(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status.as_u16() {
        401 | 403 => Err(TransportError::Unauthorized),
        code => Err(TransportError::Rejected { status: code }),
    }
}

/// Posts one outbound frame to the emit route.
pub(super) async fn post_frame(
    client: &Client,
    config: &HttpTransportConfig,
    user_id: &UserId,
    frame: &TransportFrame,
) -> Result<(), TransportError> {
    let request = client
        .post(config.route("emit"))
        .query(&[("userId", user_id.as_str())])
        .timeout(config.request_timeout)
        .json(frame);

    let response = config
        .authorize(request)
        .send()
        .await
        .map_err(|e| map_request_error(e, config.request_timeout))?;
    check_status(response)?;
    Ok(())
}

/// Builds HTTP transports in a fixed preference order.
pub struct HttpTransportFactory {
    config: Arc<HttpTransportConfig>,
    preference: Vec<TransportKind>,
    client: Client,
}

impl HttpTransportFactory {
    /// # Errors
    ///
    /// - `InvalidConfig` if the preference list is empty or the HTTP
    ///   client cannot be built
    pub fn new(
        config: HttpTransportConfig,
        preference: Vec<TransportKind>,
    ) -> Result<Self, TransportError> {
        if preference.is_empty() {
            return Err(TransportError::InvalidConfig(
                "at least one transport is required".to_string(),
            ));
        }
        let client = config.build_client()?;
        Ok(Self {
            config: Arc::new(config),
            preference,
            client,
        })
    }

    pub fn preference(&self) -> &[TransportKind] {
        &self.preference
    }
}

impl TransportFactory for HttpTransportFactory {
    fn create(&self, user_id: &UserId) -> Result<Vec<Arc<dyn Transport>>, TransportError> {
        let transports = self
            .preference
            .iter()
            .map(|kind| -> Arc<dyn Transport> {
                match kind {
                    TransportKind::Streaming => Arc::new(HttpStreamingTransport::new(
                        self.client.clone(),
                        self.config.clone(),
                        user_id.clone(),
                    )),
                    TransportKind::Polling => Arc::new(HttpPollingTransport::new(
                        self.client.clone(),
                        self.config.clone(),
                        user_id.clone(),
                    )),
                }
            })
            .collect();
        Ok(transports)
    }
}
