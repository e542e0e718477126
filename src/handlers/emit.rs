use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::ensure_positive;
use crate::broker::connection::OutboundFrame;
use crate::broker::Broker;
use crate::models::{error_response, EmitEventRequest, ErrorResponse, SuccessResponse};
use crate::state::AppState;

/// Generic escape hatch: broadcast an arbitrary named event to a conversation
/// room, or to every connected client of the tenant when no conversation is
/// given.
pub async fn emit_event(
    State(state): State<AppState>,
    Json(req): Json<EmitEventRequest>,
) -> Result<Json<SuccessResponse>, (StatusCode, Json<ErrorResponse>)> {
    ensure_positive("tenant_id", req.tenant_id)?;
    if req.event.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Event name must not be empty".to_string(),
        ));
    }

    let frame = OutboundFrame::new(&req.event, req.data);
    match req.conversation_id {
        Some(conversation_id) => {
            ensure_positive("conversation_id", conversation_id)?;
            let key = Broker::resolve(req.tenant_id, conversation_id);
            state.broker.broadcast_to_room(key, frame, None).await;
            info!(
                "Event '{}' emitted to room '{}' in tenant {}",
                req.event,
                key.name(),
                req.tenant_id
            );
        }
        None => {
            state.broker.broadcast_to_tenant(req.tenant_id, frame).await;
            info!(
                "Event '{}' emitted to all clients in tenant {}",
                req.event, req.tenant_id
            );
        }
    }

    Ok(Json(SuccessResponse { success: true }))
}
