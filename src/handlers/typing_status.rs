use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info};

use super::ensure_positive;
use crate::broker::connection::OutboundFrame;
use crate::broker::Broker;
use crate::models::{
    error_response, ErrorResponse, SuccessResponse, TypingStatusEvent, TypingStatusRequest,
    EVENT_TYPING_STATUS,
};
use crate::state::AppState;

/// Update a user's typing flag and broadcast the refreshed typing set for the
/// conversation. A `false` flag clears the entry immediately; a `true` flag
/// refreshes it and restarts the expiry window.
pub async fn typing_status(
    State(state): State<AppState>,
    Json(req): Json<TypingStatusRequest>,
) -> Result<Json<SuccessResponse>, (StatusCode, Json<ErrorResponse>)> {
    ensure_positive("tenant_id", req.tenant_id)?;
    ensure_positive("conversation_id", req.conversation_id)?;
    ensure_positive("user_id", req.user_id)?;

    let namespace = state.broker.namespace(req.tenant_id).await;
    let typing_users = namespace
        .set_typing(req.conversation_id, req.user_id, req.is_student, req.is_typing)
        .await;

    let event = TypingStatusEvent {
        conversation_id: req.conversation_id,
        tenant_id: req.tenant_id,
        typing_users,
    };
    let data = serde_json::to_value(&event).map_err(|e| {
        error!("Failed to serialize typing payload: {}", e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to serialize typing payload".to_string(),
        )
    })?;

    let key = Broker::resolve(req.tenant_id, req.conversation_id);
    namespace
        .broadcast_to_room(key, OutboundFrame::new(EVENT_TYPING_STATUS, data), None)
        .await;

    info!(
        "Typing status for user {} in conversation {} in tenant {}",
        req.user_id, req.conversation_id, req.tenant_id
    );

    Ok(Json(SuccessResponse { success: true }))
}
