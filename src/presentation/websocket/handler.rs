//! WebSocket Connection Handler
//!
//! Upgrades `/hub/message` requests and drives one hub session per socket.
//! The caller authenticates with an `access_token` query parameter and names
//! the conversation peer with `user`; both arrive before the upgrade because
//! browsers cannot set headers on WebSocket requests.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::infrastructure::metrics;
use crate::presentation::middleware::auth::decode_username;
use crate::startup::AppState;

use super::messages::{ClientEvent, ServerEvent};
use super::session::HubSession;

/// Query parameters supplied at upgrade time.
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    /// The conversation's other party
    pub user: String,
    /// Bearer token issued by the account service
    pub access_token: String,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<AppState>,
) -> Response {
    let username = match decode_username(&params.access_token, &state.settings.jwt.secret) {
        Ok(username) => username,
        Err(e) => return e.into_response(),
    };
    let peer = params.user.to_lowercase();

    ws.on_upgrade(move |socket| handle_socket(socket, state, username, peer))
}

/// Drive one hub session until the socket closes.
async fn handle_socket(socket: WebSocket, state: AppState, username: String, peer: String) {
    let connection_id = Uuid::new_v4().to_string();
    let session = HubSession::new(connection_id.clone(), username, peer);

    tracing::debug!(
        connection_id = %session.connection_id,
        username = %session.username,
        "New WebSocket connection"
    );

    // Split socket for concurrent read/write
    let (mut sender, mut receiver) = socket.split();

    // Channel for outgoing events; the gateway writes here from any task.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    // Forward queued events onto the socket in arrival order.
    let sender_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize event");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    state
        .gateway
        .register_connection(&session.connection_id, tx.clone());
    metrics::WEBSOCKET_CONNECTIONS_ACTIVE.inc();

    if let Err(e) = state.hub.connect(&session).await {
        tracing::warn!(
            connection_id = %session.connection_id,
            error = %e,
            "Connect failed"
        );
        let _ = tx.send(ServerEvent::Error {
            message: e.client_message(),
        });
        // Give the writer a moment to flush the error before tearing down.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        state.gateway.unregister_connection(&session.connection_id);
        metrics::WEBSOCKET_CONNECTIONS_ACTIVE.dec();
        sender_task.abort();
        return;
    }

    // Main receive loop; each event is handled to completion before the next.
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(ClientEvent::SendMessage(payload)) => {
                    if let Err(e) = state
                        .hub
                        .send_message(&session, &payload.recipient_username, &payload.content)
                        .await
                    {
                        let _ = tx.send(ServerEvent::Error {
                            message: e.client_message(),
                        });
                    }
                }
                Ok(ClientEvent::UserIsTyping) => state.hub.user_typing(&session),
                Err(e) => {
                    tracing::debug!(
                        connection_id = %session.connection_id,
                        error = %e,
                        "Unparseable client event"
                    );
                    let _ = tx.send(ServerEvent::Error {
                        message: "Unrecognized event".into(),
                    });
                }
            },
            Ok(Message::Close(_)) | Err(_) => break,
            // Ping/pong is answered by axum itself.
            Ok(_) => {}
        }
    }

    // The disconnect transition always runs before the connection id is gone.
    if let Err(e) = state.hub.disconnect(&session).await {
        tracing::warn!(
            connection_id = %session.connection_id,
            error = %e,
            "Disconnect cleanup failed"
        );
    }
    state.gateway.unregister_connection(&session.connection_id);
    metrics::WEBSOCKET_CONNECTIONS_ACTIVE.dec();
    sender_task.abort();

    tracing::info!(
        connection_id = %session.connection_id,
        username = %session.username,
        "Connection closed"
    );
}
