use utoipa::OpenApi;

use crate::broker::typing::Typer;
use crate::models::*;

/// Status/health check endpoint
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Server status and per-tenant stats", body = StatusResponse),
        (status = 401, description = "Invalid or missing API key", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn server_status_doc() {}

/// Server diagnostics
#[utoipa::path(
    get,
    path = "/diagnostic",
    responses(
        (status = 200, description = "Config summary, broker counters and system stats", body = DiagnosticResponse),
        (status = 401, description = "Invalid or missing API key", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostic_doc() {}

/// List connected clients
#[utoipa::path(
    get,
    path = "/connected-clients",
    responses(
        (status = 200, description = "Every live connection with its joined rooms", body = ConnectedClientsResponse),
        (status = 401, description = "Invalid or missing API key", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn connected_clients_doc() {}

/// Broadcast a message to a conversation room
#[utoipa::path(
    post,
    path = "/send-message",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message broadcast to the room", body = DeliveryResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 401, description = "Invalid or missing API key", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn send_message_doc() {}

/// Update typing status and broadcast the refreshed typing set
#[utoipa::path(
    post,
    path = "/typing-status",
    request_body = TypingStatusRequest,
    responses(
        (status = 200, description = "Typing set updated and broadcast", body = SuccessResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 401, description = "Invalid or missing API key", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn typing_status_doc() {}

/// Broadcast a read receipt to a conversation room
#[utoipa::path(
    post,
    path = "/mark-read",
    request_body = MarkReadRequest,
    responses(
        (status = 200, description = "Read receipt broadcast", body = SuccessResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 401, description = "Invalid or missing API key", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn mark_read_doc() {}

/// Emit an arbitrary named event to a room or a whole tenant
#[utoipa::path(
    post,
    path = "/emit",
    request_body = EmitEventRequest,
    responses(
        (status = 200, description = "Event emitted", body = SuccessResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 401, description = "Invalid or missing API key", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn emit_event_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        server_status_doc,
        diagnostic_doc,
        connected_clients_doc,
        send_message_doc,
        typing_status_doc,
        mark_read_doc,
        emit_event_doc,
    ),
    components(
        schemas(
            StatusResponse,
            TenantStatsResponse,
            DiagnosticResponse,
            ConnectedClientsResponse,
            ConnectedClient,
            SendMessageRequest,
            TypingStatusRequest,
            MarkReadRequest,
            EmitEventRequest,
            DeliveryResponse,
            SuccessResponse,
            ErrorResponse,
            ChatMessage,
            Sender,
            MessageType,
            TypingStatusEvent,
            ReadReceipt,
            Typer,
        )
    ),
    tags(
        (name = "gateway", description = "Endpoints for the upstream application"),
        (name = "system", description = "Status and diagnostics")
    )
)]
pub struct ApiDoc;
