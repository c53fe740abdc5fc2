//! Streaming transport - one long-lived response carrying SSE frames.
//!
//! This is the preferred transport: a single request stays open and the
//! server pushes frames as they happen. When the response ends or breaks
//! the stream ends and the client falls back or reconnects.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::header::ACCEPT;
use reqwest::Client;

use crate::domain::foundation::UserId;
use crate::ports::{FrameStream, Transport, TransportError, TransportFrame, TransportKind};

use super::http::{check_status, map_request_error, post_frame, HttpTransportConfig};
use super::sse::SseDecoder;

/// HTTP streaming transport.
pub struct HttpStreamingTransport {
    client: Client,
    config: Arc<HttpTransportConfig>,
    user_id: UserId,
}

impl HttpStreamingTransport {
    pub fn new(client: Client, config: Arc<HttpTransportConfig>, user_id: UserId) -> Self {
        Self {
            client,
            config,
            user_id,
        }
    }
}

#[async_trait]
impl Transport for HttpStreamingTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Streaming
    }

    async fn open(&self) -> Result<FrameStream, TransportError> {
        let url = self.config.route("stream");
        tracing::debug!(url = %url, user_id = %self.user_id, "Opening event stream");

        let request = self
            .client
            .get(&url)
            .query(&[("userId", self.user_id.as_str())])
            .header(ACCEPT, "text/event-stream");

        let response = self
            .config
            .authorize(request)
            .send()
            .await
            .map_err(|e| map_request_error(e, self.config.request_timeout))?;
        let response = check_status(response)?;

        let timeout = self.config.request_timeout;
        let frames = response
            .bytes_stream()
            .scan(SseDecoder::new(), move |decoder, chunk| {
                let items = match chunk {
                    Ok(bytes) => decoder.push(&bytes),
                    Err(e) => vec![Err(map_request_error(e, timeout))],
                };
                futures::future::ready(Some(items))
            })
            .flat_map(stream::iter);

        Ok(Box::pin(frames))
    }

    async fn send(&self, frame: TransportFrame) -> Result<(), TransportError> {
        post_frame(&self.client, &self.config, &self.user_id, &frame).await
    }
}
