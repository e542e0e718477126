use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use tracing::error;

use crate::auth::auth::verify_api_key;
use crate::models::{error_response, ErrorResponse};
use crate::state::AppState;

/// Credential gate applied to every route, including the socket upgrade.
///
/// A missing or mismatched key terminates the request with 401 before any
/// handler runs; for `/ws` that means the upgrade never happens.
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    // 1. The server cannot authenticate anything without a configured key
    let expected = match &state.config.tuneup_api_key {
        Some(key) => key,
        None => {
            error!("TUNEUP_API_KEY not configured");
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "API key not configured".to_string(),
            ));
        }
    };

    // 2. Validate the presented key (constant-time comparison)
    if !verify_api_key(req.headers(), expected) {
        return Err(error_response(
            StatusCode::UNAUTHORIZED,
            "Invalid or missing API key".to_string(),
        ));
    }

    // Key is valid, proceed to the handler
    Ok(next.run(req).await)
}
