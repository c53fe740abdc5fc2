//! Polling transport - repeated requests returning batches of frames.
//!
//! Used when the streaming transport cannot be opened. Each poll returns
//! the frames the server queued since the last cursor:
//!
//! ```json
//! { "cursor": "42", "frames": [ { "event": "receiveMessage", "data": { ... } } ] }
//! ```
//!
//! The first poll happens inside `open` so an unreachable server fails the
//! open instead of producing an empty stream.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;
use crate::ports::{FrameStream, Transport, TransportError, TransportFrame, TransportKind};

use super::http::{check_status, map_request_error, post_frame, HttpTransportConfig};

/// Response body of one poll.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollBatch {
    /// Opaque position to send back on the next poll.
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub frames: Vec<TransportFrame>,
}

/// HTTP polling transport.
pub struct HttpPollingTransport {
    client: Client,
    config: Arc<HttpTransportConfig>,
    user_id: UserId,
}

impl HttpPollingTransport {
    pub fn new(client: Client, config: Arc<HttpTransportConfig>, user_id: UserId) -> Self {
        Self {
            client,
            config,
            user_id,
        }
    }
}

struct PollState {
    client: Client,
    config: Arc<HttpTransportConfig>,
    user_id: UserId,
    cursor: Option<String>,
    failed: bool,
}

impl PollState {
    async fn poll(&self) -> Result<PollBatch, TransportError> {
        poll_once(&self.client, &self.config, &self.user_id, self.cursor.as_deref()).await
    }
}

async fn poll_once(
    client: &Client,
    config: &HttpTransportConfig,
    user_id: &UserId,
    cursor: Option<&str>,
) -> Result<PollBatch, TransportError> {
    let mut request = client
        .get(config.route("poll"))
        .query(&[("userId", user_id.as_str())])
        .timeout(config.request_timeout);
    if let Some(cursor) = cursor {
        request = request.query(&[("cursor", cursor)]);
    }

    let response = config
        .authorize(request)
        .send()
        .await
        .map_err(|e| map_request_error(e, config.request_timeout))?;
    let response = check_status(response)?;

    response
        .json::<PollBatch>()
        .await
        .map_err(|e| TransportError::decode(format!("invalid poll batch: {}", e)))
}

#[async_trait]
impl Transport for HttpPollingTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Polling
    }

    async fn open(&self) -> Result<FrameStream, TransportError> {
        tracing::debug!(url = %self.config.route("poll"), user_id = %self.user_id, "Starting polling");

        let first = poll_once(&self.client, &self.config, &self.user_id, None).await?;

        let state = PollState {
            client: self.client.clone(),
            config: self.config.clone(),
            user_id: self.user_id.clone(),
            cursor: first.cursor,
            failed: false,
        };

        let head = stream::iter(first.frames.into_iter().map(Ok));
        let tail = stream::unfold(state, |mut state| async move {
            if state.failed {
                return None;
            }
            match state.poll().await {
                Ok(batch) => {
                    if batch.cursor.is_some() {
                        state.cursor = batch.cursor;
                    }
                    if batch.frames.is_empty() {
                        tokio::time::sleep(state.config.poll_interval).await;
                    }
                    let items: Vec<Result<TransportFrame, TransportError>> =
                        batch.frames.into_iter().map(Ok).collect();
                    Some((items, state))
                }
                Err(e) => {
                    // A failed poll ends this connection; the client decides what next.
                    state.failed = true;
                    Some((vec![Err(e)], state))
                }
            }
        })
        .flat_map(stream::iter);

        Ok(Box::pin(head.chain(tail)))
    }

    async fn send(&self, frame: TransportFrame) -> Result<(), TransportError> {
        post_frame(&self.client, &self.config, &self.user_id, &frame).await
    }
}
