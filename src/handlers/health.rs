use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use tracing::debug;

use crate::models::{StatusResponse, TenantStatsResponse};
use crate::state::AppState;

/// Status/health check endpoint: per-tenant connection counts and uptime info.
pub async fn server_status(State(state): State<AppState>) -> Json<StatusResponse> {
    debug!("Status check requested");

    let stats = state.broker.stats().await;
    let mut tenant_stats = BTreeMap::new();
    for (tenant_id, ns_stats) in &stats.tenants {
        tenant_stats.insert(
            *tenant_id,
            TenantStatsResponse {
                total_users: ns_stats.students + ns_stats.instructors,
                students: ns_stats.students,
                instructors: ns_stats.instructors,
                rooms: ns_stats.rooms,
            },
        );
    }
    let active_tenants: Vec<_> = tenant_stats.keys().copied().collect();

    Json(StatusResponse {
        status: "online".to_string(),
        service: state.config.service_name.clone(),
        multi_tenant: true,
        total_connected_users: stats.total_connections,
        tenant_stats,
        active_tenants,
        server_time: Utc::now().to_rfc3339(),
    })
}
