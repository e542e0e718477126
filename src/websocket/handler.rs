use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::broker::connection::{ConnectionHandle, OutboundFrame};
use crate::broker::types::{Identity, Role};
use crate::config::Config;
use crate::models::{error_response, ClientEvent};
use crate::state::AppState;
use crate::websocket::events::{error_ack, handle_client_event};

/// Handshake identity, carried in the upgrade request's query string.
/// `tenant_id` may be omitted in single-tenant deployments.
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    pub id: Option<i64>,
    pub tenant_id: Option<i64>,
    #[serde(alias = "isStudent")]
    pub is_student: Option<bool>,
}

/// WebSocket handler. The API key was already checked by the auth middleware;
/// here the handshake identity is validated before the upgrade completes.
pub async fn websocket_handler(
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> Response {
    info!("New WebSocket connection attempt");
    let identity = match resolve_identity(&params, &state.config) {
        Ok(identity) => identity,
        Err(reason) => {
            warn!("Connection rejected: {}", reason);
            return error_response(StatusCode::BAD_REQUEST, reason).into_response();
        }
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
}

fn resolve_identity(params: &ConnectParams, config: &Config) -> Result<Identity, String> {
    let user_id = params
        .id
        .ok_or_else(|| "Missing user id in handshake".to_string())?;
    if user_id <= 0 {
        return Err(format!("Invalid user id ({}) in handshake", user_id));
    }
    let tenant_id = params.tenant_id.unwrap_or(config.default_tenant_id);
    if tenant_id <= 0 {
        return Err(format!("Invalid tenant_id ({}) in handshake", tenant_id));
    }
    Ok(Identity {
        tenant_id,
        user_id,
        role: Role::from_is_student(params.is_student.unwrap_or(true)),
    })
}

/// Handle one WebSocket connection from registration to cleanup.
async fn handle_socket(socket: WebSocket, state: AppState, identity: Identity) {
    // Generate unique connection ID to identify this client
    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<OutboundFrame>();

    let namespace = state.broker.namespace(identity.tenant_id).await;
    namespace
        .register(ConnectionHandle::new(connection_id, identity.clone(), tx.clone()))
        .await;

    // Split the socket into sender and receiver
    let (mut sink, mut stream) = socket.split();

    // Writer task: drain the outbound queue to the socket, in order.
    let mut write_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let text = match serde_json::to_string(&frame) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize outbound frame '{}': {}", frame.event, e);
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Reader task: parse inbound frames and dispatch them, acking each one.
    let read_namespace = namespace.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(result) = stream.next().await {
            let msg = match result {
                Ok(msg) => msg,
                Err(_) => break,
            };
            let text = match msg {
                Message::Text(text) => text,
                Message::Close(_) => break,
                // Ping/pong are handled by the transport; binary is ignored
                _ => continue,
            };

            let event: ClientEvent = match serde_json::from_str(&text) {
                Ok(event) => event,
                Err(e) => {
                    warn!("Failed to parse frame from {}: {}", connection_id, e);
                    let _ = tx.send(OutboundFrame::new(
                        "ack",
                        error_ack(None, format!("Malformed event: {}", e)),
                    ));
                    continue;
                }
            };

            let ack = handle_client_event(&read_namespace, connection_id, &identity, event).await;
            let _ = tx.send(OutboundFrame::new("ack", ack));
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut write_task) => read_task.abort(),
        _ = (&mut read_task) => write_task.abort(),
    };

    // Exactly one cleanup per connection, whatever ended the session.
    namespace.deregister(connection_id).await;
    info!("WebSocket connection terminated: {}", connection_id);
}
