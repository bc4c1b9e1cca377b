//! Live-update socket.
//!
//! A client authenticates with `{"type":"AUTH","userId":..}`, gets
//! `AUTH_SUCCESS` back, and from then on receives the user's change-events.
//! Reconnecting as the same user replaces the older connection.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use mindflow_core::{ConnectionHandle, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::AppState;

/// `userId` as sent by clients: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawUserId {
    Number(i64),
    Text(String),
}

impl RawUserId {
    pub fn resolve(&self) -> Option<UserId> {
        let id = match self {
            RawUserId::Number(n) => *n,
            RawUserId::Text(s) => s.trim().parse().ok()?,
        };
        (id > 0).then_some(id)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    Auth {
        #[serde(rename = "userId")]
        user_id: RawUserId,
        #[serde(default)]
        timestamp: Option<serde_json::Value>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    AuthSuccess { timestamp: DateTime<Utc> },
}

pub fn parse_client_message(text: &str) -> serde_json::Result<ClientMessage> {
    serde_json::from_str(text)
}

pub(crate) async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Ends once every sender is gone, which includes being displaced from
    // the registry by a newer connection for the same user.
    let writer = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                return;
            }
        }
        let _ = sink.send(Message::Close(None)).await;
    });

    let handle = ConnectionHandle::new(tx);
    let connection_id = handle.id();
    // Moved into the registry on AUTH so the registry owns the only sender.
    let mut pending = Some(handle);
    let mut user: Option<UserId> = None;

    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!(connection = %connection_id, error = %e, "websocket read failed");
                break;
            }
        };

        let ClientMessage::Auth { user_id, .. } = match parse_client_message(&text) {
            Ok(message) => message,
            Err(e) => {
                warn!(connection = %connection_id, error = %e, "malformed websocket frame");
                continue;
            }
        };
        let Some(user_id) = user_id.resolve() else {
            warn!(connection = %connection_id, "AUTH frame without a valid userId");
            continue;
        };
        let Some(handle) = pending.take() else {
            warn!(connection = %connection_id, user_id, "connection already authenticated");
            continue;
        };

        // Registered before the reply goes out, so a client that has seen
        // AUTH_SUCCESS is guaranteed to receive later events.
        let reply_to = handle.clone();
        if let Some(displaced) = state.registry.register(user_id, handle) {
            debug!(user_id, displaced = %displaced.id(), "replaced existing connection");
        }
        let reply = ServerMessage::AuthSuccess {
            timestamp: Utc::now(),
        };
        match serde_json::to_string(&reply) {
            Ok(json) => {
                reply_to.send(json);
            }
            Err(e) => error!(error = %e, "failed to encode AUTH_SUCCESS"),
        }
        drop(reply_to);
        user = Some(user_id);
        info!(user_id, connection = %connection_id, "websocket authenticated");
    }

    if let Some(user_id) = user {
        state.registry.unregister(user_id, connection_id);
        info!(user_id, connection = %connection_id, "websocket closed");
    }
    drop(pending);
    writer.abort();
}
