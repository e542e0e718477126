use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info};

use super::ensure_positive;
use crate::broker::connection::OutboundFrame;
use crate::broker::Broker;
use crate::models::{
    error_response, ErrorResponse, MarkReadRequest, ReadReceipt, SuccessResponse,
    EVENT_MESSAGES_READ,
};
use crate::state::AppState;

/// Broadcast a read receipt to a conversation room. The relay only announces
/// who read; the per-message read ledger lives in the upstream application.
pub async fn mark_read(
    State(state): State<AppState>,
    Json(req): Json<MarkReadRequest>,
) -> Result<Json<SuccessResponse>, (StatusCode, Json<ErrorResponse>)> {
    ensure_positive("tenant_id", req.tenant_id)?;
    ensure_positive("conversation_id", req.conversation_id)?;
    ensure_positive("user_id", req.user_id)?;

    let receipt = ReadReceipt {
        conversation_id: req.conversation_id,
        tenant_id: req.tenant_id,
        user_id: req.user_id,
        is_student: req.is_student,
    };
    let data = serde_json::to_value(&receipt).map_err(|e| {
        error!("Failed to serialize read receipt: {}", e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to serialize read receipt".to_string(),
        )
    })?;

    let key = Broker::resolve(req.tenant_id, req.conversation_id);
    state
        .broker
        .broadcast_to_room(key, OutboundFrame::new(EVENT_MESSAGES_READ, data), None)
        .await;

    info!(
        "Messages read by user {} in conversation {} in tenant {}",
        req.user_id, req.conversation_id, req.tenant_id
    );

    Ok(Json(SuccessResponse { success: true }))
}
