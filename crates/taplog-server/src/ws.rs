//! WebSocket viewer sessions.
//!
//! Each connected browser gets one hub subscription and a forward task that
//! drains it into the socket. Viewers only listen; the read side exists to
//! notice the close so the subscription can be removed promptly.

use crate::AppState;
use axum::{
    extract::{
        ws::{Message as AxumMessage, WebSocket},
        ConnectInfo, Extension, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use chrono::SecondsFormat;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc};
use taplog_types::LogEvent;

/// Origin address as delivered to viewers.
#[derive(Debug, Serialize)]
pub struct WsSourceAddr {
    pub ip: String,
    pub port: u16,
}

/// Outgoing log payload with camelCase field names.
///
/// The domain `LogEvent` uses snake_case; the wire uses camelCase to match
/// the viewer script's field names. Tags are flattened to plain strings
/// (empty when absent); the timestamp is ISO-8601.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WsLogPayload {
    pub raw: String,
    pub category: String,
    pub secondary_tag: String,
    pub tertiary_tag: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_address: Option<WsSourceAddr>,
    pub timestamp: String,
}

impl From<LogEvent> for WsLogPayload {
    fn from(event: LogEvent) -> Self {
        Self {
            raw: event.raw,
            category: event.category,
            secondary_tag: event.secondary_tag.unwrap_or_default(),
            tertiary_tag: event.tertiary_tag.unwrap_or_default(),
            message: event.message,
            source_address: event.source.map(|s| WsSourceAddr {
                ip: s.ip,
                port: s.port,
            }),
            timestamp: event
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Outgoing WebSocket frame wrapper.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum OutgoingFrame {
    #[serde(rename = "log")]
    Log(WsLogPayload),
}

/// WebSocket handler: `GET /ws`.
pub async fn ws_handler(
    Extension(state): Extension<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    tracing::info!(remote_addr = %addr, "viewer connecting");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles one viewer session from upgrade to close.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut subscription = state.hub.subscribe();
    let subscriber_id = subscription.id;

    // Forward hub events into the socket until either side goes away.
    let send_task = tokio::spawn(async move {
        while let Some(event) = subscription.receiver.recv().await {
            let frame = OutgoingFrame::Log(event.into());
            match serde_json::to_string(&frame) {
                Ok(json) => {
                    if sender.send(AxumMessage::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("failed to serialize log frame: {}", e);
                }
            }
        }
    });

    // Viewers send nothing meaningful; drain until close or error.
    while let Some(Ok(msg)) = receiver.next().await {
        if let AxumMessage::Close(_) = msg {
            break;
        }
    }

    state.hub.unsubscribe(subscriber_id);
    send_task.abort();
    tracing::info!(subscriber = %subscriber_id, "viewer disconnected");
}
