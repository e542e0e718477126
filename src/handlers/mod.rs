pub mod connected_clients;
pub mod diagnostics;
pub mod emit;
pub mod health;
pub mod mark_read;
pub mod send_message;
pub mod typing_status;

pub use connected_clients::*;
pub use diagnostics::*;
pub use emit::*;
pub use health::*;
pub use mark_read::*;
pub use send_message::*;
pub use typing_status::*;

use axum::http::StatusCode;
use axum::Json;

use crate::models::{error_response, ErrorResponse};

/// Identifiers from the upstream application are positive integers; anything
/// else in a request body is a bad request, not an internal failure.
pub(crate) fn ensure_positive(
    field: &str,
    value: i64,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if value <= 0 {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid {}: must be a positive integer", field),
        ));
    }
    Ok(())
}
