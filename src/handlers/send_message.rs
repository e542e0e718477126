use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use tracing::{error, info};

use super::ensure_positive;
use crate::broker::connection::OutboundFrame;
use crate::broker::Broker;
use crate::models::{
    error_response, ChatMessage, DeliveryResponse, ErrorResponse, Sender, SendMessageRequest,
    EVENT_NEW_MESSAGE,
};
use crate::state::AppState;

/// Broadcast a message from the upstream application to a conversation room.
///
/// The relay stamps `sent_at` and fans out; it never stores the message.
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<DeliveryResponse>, (StatusCode, Json<ErrorResponse>)> {
    ensure_positive("tenant_id", req.tenant_id)?;
    ensure_positive("conversation_id", req.conversation_id)?;
    ensure_positive("user_id", req.user_id)?;

    let message = ChatMessage {
        id: req.message_id,
        content: req.content,
        message_type: req.message_type,
        attachment_url: req.attachment_url,
        sent_at: Utc::now().to_rfc3339(),
        sender: Sender {
            id: req.user_id,
            is_student: req.is_student,
        },
        conversation_id: req.conversation_id,
        tenant_id: req.tenant_id,
    };
    let data = serde_json::to_value(&message).map_err(|e| {
        error!("Failed to serialize message payload: {}", e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to serialize message payload".to_string(),
        )
    })?;

    let key = Broker::resolve(req.tenant_id, req.conversation_id);
    let delivered_to = state
        .broker
        .broadcast_to_room(key, OutboundFrame::new(EVENT_NEW_MESSAGE, data), None)
        .await;

    info!(
        "Message {:?} sent to conversation {} in tenant {}",
        message.id, req.conversation_id, req.tenant_id
    );

    Ok(Json(DeliveryResponse {
        success: true,
        delivered_to,
        message_id: message.id,
    }))
}
