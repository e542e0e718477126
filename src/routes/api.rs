use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::{
    connected_clients, diagnostic, emit_event, mark_read, send_message, server_status,
    typing_status,
};
use crate::routes::auth_middleware::auth_middleware;
use crate::state::AppState;
use crate::websocket::handler::websocket_handler;

/// Create the application routes. Every route, the socket upgrade included,
/// sits behind the API-key middleware.
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(server_status))
        .route("/diagnostic", get(diagnostic))
        .route("/connected-clients", get(connected_clients))
        .route("/send-message", post(send_message))
        .route("/typing-status", post(typing_status))
        .route("/mark-read", post(mark_read))
        .route("/emit", post(emit_event))
        .route("/ws", get(websocket_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        )) // Applies to all routes added above
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::auth::API_KEY_HEADER;
    use crate::broker::connection::{ConnectionHandle, OutboundFrame};
    use crate::broker::types::{Identity, Role};
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tokio::sync::mpsc::UnboundedReceiver;
    use tower::ServiceExt;
    use uuid::Uuid;

    const TEST_KEY: &str = "test-key";

    fn test_state() -> AppState {
        AppState::new(Config {
            tuneup_api_key: Some(TEST_KEY.to_string()),
            ..Config::default()
        })
    }

    /// Register a fake socket connection joined to a conversation; the
    /// returned receiver observes everything broadcast to it.
    async fn connect(
        state: &AppState,
        tenant_id: i64,
        user_id: i64,
        conversation_id: i64,
    ) -> UnboundedReceiver<OutboundFrame> {
        let id = Uuid::new_v4();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let ns = state.broker.namespace(tenant_id).await;
        ns.register(ConnectionHandle::new(
            id,
            Identity {
                tenant_id,
                user_id,
                role: Role::Student,
            },
            tx,
        ))
        .await;
        ns.join(id, conversation_id).await;
        rx
    }

    fn post(path: &str, key: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn send_message_without_api_key_is_401_and_broadcasts_nothing() {
        let state = test_state();
        let mut rx = connect(&state, 1, 102, 5).await;
        let app = create_routes(state);

        let body = json!({
            "conversation_id": 5, "tenant_id": 1, "user_id": 101,
            "is_student": true, "content": "hi"
        });
        let response = app.oneshot(post("/send-message", None, body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn send_message_reaches_room_members() {
        let state = test_state();
        let mut rx = connect(&state, 1, 102, 5).await;
        let app = create_routes(state);

        let body = json!({
            "message_id": 7, "conversation_id": 5, "tenant_id": 1,
            "user_id": 101, "is_student": true, "content": "hello there"
        });
        let response = app
            .oneshot(post("/send-message", Some(TEST_KEY), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["delivered_to"], 1);
        assert_eq!(json["message_id"], 7);

        let frame = rx.try_recv().unwrap();
        assert_eq!(frame.event, "new_message");
        assert_eq!(frame.data["content"], "hello there");
        assert_eq!(frame.data["sender"]["id"], 101);
        assert!(frame.data["sent_at"].is_string());
    }

    #[tokio::test]
    async fn send_message_rejects_non_positive_ids() {
        let app = create_routes(test_state());
        let body = json!({
            "conversation_id": 0, "tenant_id": 1, "user_id": 101,
            "is_student": true, "content": "hi"
        });
        let response = app
            .oneshot(post("/send-message", Some(TEST_KEY), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn typing_status_broadcasts_refreshed_set() {
        let state = test_state();
        let mut rx = connect(&state, 1, 102, 5).await;
        let app = create_routes(state);

        let body = json!({
            "conversation_id": 5, "tenant_id": 1, "user_id": 101,
            "is_student": true, "is_typing": true
        });
        let response = app
            .oneshot(post("/typing-status", Some(TEST_KEY), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let frame = rx.try_recv().unwrap();
        assert_eq!(frame.event, "typing_status");
        assert_eq!(frame.data["typing_users"][0]["user_id"], 101);
        assert_eq!(frame.data["typing_users"][0]["is_student"], true);
    }

    #[tokio::test]
    async fn mark_read_broadcasts_reader_identity() {
        let state = test_state();
        let mut rx = connect(&state, 1, 102, 5).await;
        let app = create_routes(state);

        let body = json!({
            "conversation_id": 5, "tenant_id": 1, "user_id": 101, "is_student": false
        });
        let response = app
            .oneshot(post("/mark-read", Some(TEST_KEY), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let frame = rx.try_recv().unwrap();
        assert_eq!(frame.event, "messages_read");
        assert_eq!(frame.data["user_id"], 101);
        assert_eq!(frame.data["is_student"], false);
    }

    #[tokio::test]
    async fn emit_without_conversation_reaches_whole_tenant() {
        let state = test_state();
        // Joined to a room in tenant 1, but the emit targets the tenant at large
        let mut tenant1_rx = connect(&state, 1, 101, 5).await;
        let mut tenant2_rx = connect(&state, 2, 201, 5).await;
        let app = create_routes(state);

        let body = json!({
            "event": "maintenance_notice", "data": {"until": "soon"}, "tenant_id": 1
        });
        let response = app.oneshot(post("/emit", Some(TEST_KEY), body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let frame = tenant1_rx.try_recv().unwrap();
        assert_eq!(frame.event, "maintenance_notice");
        assert!(tenant2_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn emit_rejects_empty_event_name() {
        let app = create_routes(test_state());
        let body = json!({ "event": " ", "data": {}, "tenant_id": 1 });
        let response = app.oneshot(post("/emit", Some(TEST_KEY), body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn status_endpoint_reports_tenant_stats() {
        let state = test_state();
        let _rx = connect(&state, 1, 101, 5).await;
        let app = create_routes(state);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/")
            .header(API_KEY_HEADER, TEST_KEY)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "online");
        assert_eq!(json["total_connected_users"], 1);
        assert_eq!(json["tenant_stats"]["1"]["students"], 1);
    }

    #[tokio::test]
    async fn diagnostic_reports_api_key_configured() {
        let app = create_routes(test_state());
        let request = Request::builder()
            .method(Method::GET)
            .uri("/diagnostic")
            .header(API_KEY_HEADER, TEST_KEY)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["api_key_configured"], true);
        assert_eq!(json["typing_expiry_secs"], 10);
    }

    #[tokio::test]
    async fn connected_clients_lists_rooms() {
        let state = test_state();
        let _rx = connect(&state, 1, 101, 5).await;
        let app = create_routes(state);

        let request = Request::builder()
            .method(Method::GET)
            .uri("/connected-clients")
            .header(API_KEY_HEADER, TEST_KEY)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_connected_clients"], 1);
        assert_eq!(
            json["connected_clients"][0]["rooms"][0],
            "tenant_1_conversation_5"
        );
    }

    #[tokio::test]
    async fn websocket_upgrade_requires_api_key() {
        let app = create_routes(test_state());
        let request = Request::builder()
            .method(Method::GET)
            .uri("/ws?id=101&tenant_id=1")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
