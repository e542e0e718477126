use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::broker::types::{TenantId, UserId};

/// Response for a message broadcast
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeliveryResponse {
    pub success: bool,
    /// Number of connections the event was queued for.
    pub delivered_to: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
}

/// Response for operations with nothing to report beyond success
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Per-tenant connection counters in the status response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantStatsResponse {
    pub total_users: usize,
    pub students: usize,
    pub instructors: usize,
    pub rooms: usize,
}

/// Response for the GET / status endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub service: String,
    pub multi_tenant: bool,
    pub total_connected_users: usize,
    /// Keyed by tenant id; BTreeMap keeps the listing stable.
    pub tenant_stats: BTreeMap<TenantId, TenantStatsResponse>,
    pub active_tenants: Vec<TenantId>,
    pub server_time: String,
}

/// Response for diagnostics information
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiagnosticResponse {
    pub service: String,
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub api_key_configured: bool,
    pub typing_expiry_secs: u64,
    pub n_connections: usize,
    pub n_rooms: usize,
    pub n_typers: usize,
    pub cpu_usage: f32,
    pub memory_alloc: u64,
    pub memory_total: u64,
    pub memory_free: u64,
}

/// One connection in the connected-clients listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConnectedClient {
    pub sid: Uuid,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub user_type: String,
    pub rooms: Vec<String>,
}

/// Response for the GET /connected-clients endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConnectedClientsResponse {
    pub total_connected_clients: usize,
    pub connected_clients: Vec<ConnectedClient>,
}
