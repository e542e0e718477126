use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::models::{ConnectedClient, ConnectedClientsResponse};
use crate::state::AppState;

/// Every live connection across all tenant namespaces, with its joined rooms.
pub async fn connected_clients(State(state): State<AppState>) -> Json<ConnectedClientsResponse> {
    let snapshots = state.broker.connected_clients().await;
    let connected_clients: Vec<ConnectedClient> = snapshots
        .into_iter()
        .map(|snapshot| ConnectedClient {
            sid: snapshot.connection_id,
            tenant_id: snapshot.tenant_id,
            user_id: snapshot.user_id,
            user_type: snapshot.role.as_str().to_string(),
            rooms: snapshot.rooms,
        })
        .collect();

    info!(
        "Total connected clients across all namespaces: {}",
        connected_clients.len()
    );

    Json(ConnectedClientsResponse {
        total_connected_clients: connected_clients.len(),
        connected_clients,
    })
}
