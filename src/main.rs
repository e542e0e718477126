mod auth;
mod broker;
mod config;
mod docs;
mod handlers;
mod models;
mod routes;
mod state;
mod websocket;

use std::panic;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::Config;
use docs::ApiDoc;
use routes::cors::cors_layer;
use routes::create_routes;
use state::AppState;

#[tokio::main]
async fn main() {
    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "tuneup_broadcast=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });

    // The relay refuses to start without a shared secret
    let Some(api_key) = &config.tuneup_api_key else {
        error!("TUNEUP_API_KEY environment variable must be set");
        std::process::exit(1);
    };
    info!("API Key configured: {}...", &api_key.chars().take(4).collect::<String>());
    info!("Multi-tenant namespaces enabled - no database required");

    let cors = cors_layer(&config);
    let server_address = config.server_address();
    let state = AppState::new(config);

    // Combine all routes
    let app_routes = Router::new()
        // Mount API + WebSocket routes
        .merge(create_routes(state))
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&server_address)
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", server_address));

    info!("🚀 Server running on http://{}", server_address);
    info!("📡 WebSocket available at ws://{}/ws", server_address);
    info!("📚 Swagger UI available at http://{}/swagger", server_address);

    axum::serve(listener, app_routes)
        .await
        .expect("Server failed to start");
}
