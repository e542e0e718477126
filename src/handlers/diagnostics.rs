use std::sync::{Mutex, OnceLock};

use axum::extract::State;
use axum::Json;
use sysinfo::System;
use tracing::info;

use crate::models::DiagnosticResponse;
use crate::state::AppState;

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Server diagnostics: config summary, broker counters and system stats.
/// Gated by the API key like everything else.
pub async fn diagnostic(State(state): State<AppState>) -> Json<DiagnosticResponse> {
    let stats = state.broker.stats().await;

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let sys_lock = SYSTEM_MONITOR.get_or_init(|| Mutex::new(System::new_all()));
        match sys_lock.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu();
                sys.refresh_memory();
                (
                    sys.global_cpu_info().cpu_usage(),
                    sys.used_memory(),
                    sys.free_memory(),
                    sys.total_memory(),
                )
            }
            Err(_) => (0.0, 0, 0, 0),
        }
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Conn: {}, Rooms: {}",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        stats.total_connections,
        stats.total_rooms
    );

    Json(DiagnosticResponse {
        service: state.config.service_name.clone(),
        environment: state.config.environment.clone(),
        host: state.config.host.clone(),
        port: state.config.port,
        api_key_configured: state.config.tuneup_api_key.is_some(),
        typing_expiry_secs: state.config.typing_expiry_secs,
        n_connections: stats.total_connections,
        n_rooms: stats.total_rooms,
        n_typers: stats.total_typers,
        cpu_usage,
        memory_alloc,
        memory_total,
        memory_free,
    })
}
