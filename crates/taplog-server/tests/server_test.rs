//! Integration tests for the web server: health route and WebSocket fan-out.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use futures_util::StreamExt;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use taplog_hub::Hub;
use taplog_server::{app, AppState};
use taplog_types::LogEvent;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

fn event(raw: &str, category: &str) -> LogEvent {
    LogEvent {
        raw: raw.to_string(),
        category: category.to_string(),
        secondary_tag: None,
        tertiary_tag: None,
        message: raw.to_string(),
        source: None,
        timestamp: Utc::now(),
    }
}

/// Serves the app on an ephemeral port and returns its address plus the hub.
async fn serve_app() -> (SocketAddr, Arc<Hub>) {
    let hub = Arc::new(Hub::new());
    let app = app(
        AppState { hub: hub.clone() },
        "nonexistent-viewer-dir",
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind an ephemeral port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    (addr, hub)
}

async fn next_json(socket: &mut WebSocketStream<MaybeTlsStream<TcpStream>>) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for frame")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("frame should be JSON");
        }
    }
}

/// Polls until `condition` holds or five seconds pass.
async fn wait_until(mut condition: impl FnMut() -> bool, what: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting until {}",
            what
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn health_check_returns_ok() {
    let app = app(
        AppState {
            hub: Arc::new(Hub::new()),
        },
        "nonexistent-viewer-dir",
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn viewer_receives_published_events_in_order() {
    let (addr, hub) = serve_app().await;

    let (mut socket, _response) = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("websocket should connect");

    // The session registers with the hub shortly after the upgrade; events
    // published before that would (correctly) never be delivered.
    let hub_poll = hub.clone();
    wait_until(move || hub_poll.subscriber_count() > 0, "viewer subscribed").await;

    hub.publish(&event("[A] first", "A"));
    hub.publish(&event("plain second", "uncategorized"));

    let first = next_json(&mut socket).await;
    assert_eq!(first["type"], "log");
    assert_eq!(first["raw"], "[A] first");
    assert_eq!(first["category"], "A");
    assert_eq!(first["secondaryTag"], "");
    assert!(first["timestamp"].is_string());
    assert!(first.get("sourceAddress").is_none());

    let second = next_json(&mut socket).await;
    assert_eq!(second["raw"], "plain second");
    assert_eq!(second["category"], "uncategorized");
}

#[tokio::test]
async fn every_viewer_gets_every_event() {
    let (addr, hub) = serve_app().await;

    let (mut first, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    let (mut second, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();

    let hub_poll = hub.clone();
    wait_until(move || hub_poll.subscriber_count() == 2, "both viewers subscribed").await;

    hub.publish(&event("[B] shared", "B"));

    assert_eq!(next_json(&mut first).await["raw"], "[B] shared");
    assert_eq!(next_json(&mut second).await["raw"], "[B] shared");
}

#[tokio::test]
async fn closing_viewer_is_removed_from_hub() {
    let (addr, hub) = serve_app().await;

    let (socket, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    let hub_poll = hub.clone();
    wait_until(move || hub_poll.subscriber_count() == 1, "viewer subscribed").await;

    drop(socket);
    let hub_poll = hub.clone();
    wait_until(move || hub_poll.subscriber_count() == 0, "viewer removed").await;
}
