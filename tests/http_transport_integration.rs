//! Integration tests for the HTTP transports against a fixture server.
//!
//! The fixture serves the realtime routes the transports expect:
//! - `GET  /socket/stream` - one SSE body, then the response ends
//! - `GET  /socket/poll`   - one batch, then empty batches
//! - `POST /socket/emit`   - records outbound frames
//!
//! `/fallback` serves only poll and emit, so streaming gets a 404 there.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde_json::{json, Value};

use job_notifications::adapters::realtime::{
    ClientOptions, ConnectionManager, HttpPollingTransport, HttpStreamingTransport,
    HttpTransportConfig, HttpTransportFactory,
};
use job_notifications::application::{NotificationSession, NotifyRecipientCommand, NotifyRecipientHandler};
use job_notifications::domain::foundation::{MessageId, UserId};
use job_notifications::domain::notification::kinds;
use job_notifications::domain::user::User;
use job_notifications::ports::{
    Transport, TransportError, TransportFrame, TransportKind, MESSAGE_RECEIVED_EVENT,
    NOTIFICATION_REQUEST_EVENT,
};

const TOKEN: &str = "test-token";
const USER: &str = "candidate-1";

// =============================================================================
// Fixture Server
// =============================================================================

#[derive(Clone, Default)]
struct Fixture {
    emitted: Arc<Mutex<Vec<(String, Value)>>>,
    polls: Arc<AtomicUsize>,
}

impl Fixture {
    fn emitted(&self) -> Vec<(String, Value)> {
        self.emitted.lock().unwrap().clone()
    }
}

fn message_json(id: &str) -> Value {
    json!({
        "id": id,
        "sender": { "id": "recruiter-1", "name": "Rita Recruiter" },
        "content": "Can we talk tomorrow?",
        "channelId": "chan-1",
        "createdAt": "2024-05-02T09:15:00Z"
    })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(&format!("Bearer {}", TOKEN)[..])
}

async fn stream(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let body = format!(
        ": connected\n\nevent: receiveMessage\ndata: {}\n\nevent: typing\ndata: {{\"channelId\":\"chan-1\"}}\n\n",
        message_json("sse-1")
    );
    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

async fn poll(
    State(fixture): State<Fixture>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    fixture.polls.fetch_add(1, Ordering::SeqCst);
    let batch = match query.get("cursor") {
        None => json!({
            "cursor": "1",
            "frames": [ { "event": MESSAGE_RECEIVED_EVENT, "data": message_json("poll-1") } ]
        }),
        Some(cursor) => json!({ "cursor": cursor, "frames": [] }),
    };
    Json(batch).into_response()
}

async fn emit(
    State(fixture): State<Fixture>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    let user = query.get("userId").cloned().unwrap_or_default();
    fixture.emitted.lock().unwrap().push((user, body));
    StatusCode::NO_CONTENT
}

async fn spawn_server() -> (String, Fixture) {
    let fixture = Fixture::default();
    let app = Router::new()
        .route("/socket/stream", get(stream))
        .route("/socket/poll", get(poll))
        .route("/socket/emit", post(emit))
        .route("/fallback/poll", get(poll))
        .route("/fallback/emit", post(emit))
        .with_state(fixture.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), fixture)
}

fn config(endpoint: &str) -> HttpTransportConfig {
    HttpTransportConfig::new(endpoint)
        .with_auth_token(TOKEN)
        .with_request_timeout(Duration::from_secs(5))
        .with_poll_interval(Duration::from_millis(20))
}

fn user() -> UserId {
    UserId::new(USER).unwrap()
}

async fn eventually(what: &str, condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for: {}", what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// =============================================================================
// Streaming
// =============================================================================

#[tokio::test]
async fn streaming_transport_decodes_sse_frames() {
    let (endpoint, _) = spawn_server().await;
    let config = config(&endpoint);
    let transport =
        HttpStreamingTransport::new(config.build_client().unwrap(), Arc::new(config), user());

    let frames = match transport.open().await {
        Ok(frames) => frames,
        Err(e) => panic!("open failed: {}", e),
    };
    let frames: Vec<TransportFrame> =
        tokio::time::timeout(Duration::from_secs(5), frames.collect::<Vec<_>>())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].event, MESSAGE_RECEIVED_EVENT);
    assert_eq!(frames[0].data["id"], "sse-1");
    assert_eq!(frames[1].event, "typing");
}

#[tokio::test]
async fn streaming_without_credentials_is_unauthorized() {
    let (endpoint, _) = spawn_server().await;
    let config = HttpTransportConfig::new(&endpoint).with_auth_token(TOKEN).with_credentials(false);
    let transport =
        HttpStreamingTransport::new(config.build_client().unwrap(), Arc::new(config), user());

    match transport.open().await {
        Err(e) => assert_eq!(e, TransportError::Unauthorized),
        Ok(_) => panic!("open should fail without credentials"),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let config = config(&endpoint);
    let transport =
        HttpStreamingTransport::new(config.build_client().unwrap(), Arc::new(config), user());

    match transport.open().await {
        Err(e) => {
            assert!(matches!(e, TransportError::Network(_)), "got {:?}", e);
            assert!(e.is_retryable());
        }
        Ok(_) => panic!("open should fail"),
    }
}

// =============================================================================
// Polling
// =============================================================================

#[tokio::test]
async fn polling_transport_yields_batches_and_keeps_polling() {
    let (endpoint, fixture) = spawn_server().await;
    let config = config(&endpoint);
    let transport =
        HttpPollingTransport::new(config.build_client().unwrap(), Arc::new(config), user());

    let mut frames = match transport.open().await {
        Ok(frames) => frames,
        Err(e) => panic!("open failed: {}", e),
    };
    let first = frames.next().await.unwrap().unwrap();
    assert_eq!(first.data["id"], "poll-1");

    // Empty batches keep the stream alive and the polls coming.
    let next = tokio::time::timeout(Duration::from_millis(200), frames.next()).await;
    assert!(next.is_err());
    assert!(fixture.polls.load(Ordering::SeqCst) >= 2);
}

// =============================================================================
// Emit
// =============================================================================

#[tokio::test]
async fn send_posts_frame_to_emit_route() {
    let (endpoint, fixture) = spawn_server().await;
    let config = config(&endpoint);
    let transport =
        HttpStreamingTransport::new(config.build_client().unwrap(), Arc::new(config), user());

    transport
        .send(TransportFrame::new(
            NOTIFICATION_REQUEST_EVENT,
            json!({ "recipientId": "candidate-9", "type": "rejected", "message": "Position filled" }),
        ))
        .await
        .unwrap();

    let emitted = fixture.emitted();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].0, USER);
    assert_eq!(emitted[0].1["event"], NOTIFICATION_REQUEST_EVENT);
    assert_eq!(emitted[0].1["data"]["recipientId"], "candidate-9");
}

// =============================================================================
// End to end
// =============================================================================

#[tokio::test]
async fn session_falls_back_to_polling_and_emits_over_http() {
    let (endpoint, fixture) = spawn_server().await;
    let factory = HttpTransportFactory::new(
        config(&endpoint).with_path("/fallback"),
        vec![TransportKind::Streaming, TransportKind::Polling],
    )
    .unwrap();
    let connections = ConnectionManager::new(
        Arc::new(factory),
        ClientOptions::default().with_reconnect_base(Duration::from_millis(20)),
    );
    let session = NotificationSession::start(User::new(user()), &connections, 20).unwrap();

    assert_eq!(session.client().connected().await, Some(TransportKind::Polling));

    let feed = session.feed().clone();
    eventually("polled message in feed", || {
        feed.contains(&MessageId::new("poll-1").unwrap())
    })
    .await;
    assert_eq!(feed.unread_count(), 1);

    NotifyRecipientHandler::new(session.emitter())
        .handle(NotifyRecipientCommand {
            recipient_id: "candidate-9".to_string(),
            kind: kinds::CANDIDATE_SHORTLISTED.to_string(),
            message: "Shortlisted".to_string(),
        })
        .unwrap();

    eventually("frame emitted", || !fixture.emitted().is_empty()).await;
    assert_eq!(fixture.emitted()[0].1["data"]["type"], "shortlisted");
}

#[tokio::test]
async fn session_over_streaming_ignores_redelivered_messages() {
    let (endpoint, _) = spawn_server().await;
    let factory =
        HttpTransportFactory::new(config(&endpoint), vec![TransportKind::Streaming]).unwrap();
    let connections = ConnectionManager::new(
        Arc::new(factory),
        ClientOptions::default().with_reconnect_base(Duration::from_millis(20)),
    );
    let session = NotificationSession::start(User::new(user()), &connections, 20).unwrap();

    let feed = session.feed().clone();
    eventually("streamed message in feed", || {
        feed.contains(&MessageId::new("sse-1").unwrap())
    })
    .await;

    // The fixture ends each response, so the client reconnects and the
    // same message is delivered again.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(feed.snapshot().len(), 1);
    assert_eq!(feed.unread_count(), 1);
}
