pub mod connection;
pub mod namespace;
pub mod rooms;
pub mod types;
pub mod typing;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use connection::OutboundFrame;
use namespace::{ClientSnapshot, NamespaceStats, TenantNamespace};
use types::{ConnectionId, ConversationId, RoomKey, TenantId};

/// Aggregate counters across all tenants, for the diagnostics endpoint.
#[derive(Debug, Clone, Default)]
pub struct BrokerStats {
    pub total_connections: usize,
    pub total_rooms: usize,
    pub total_typers: usize,
    pub tenants: HashMap<TenantId, NamespaceStats>,
}

/// The single-process event broker: a registry of isolated tenant namespaces.
///
/// Namespaces are created lazily and each carries its own lock, so all state
/// access is scoped to one tenant at a time. The only way to address a room
/// is through [`Broker::resolve`], which always binds the tenant id into the
/// key.
pub struct Broker {
    typing_expiry: Duration,
    namespaces: RwLock<HashMap<TenantId, Arc<TenantNamespace>>>,
}

impl Broker {
    pub fn new(typing_expiry: Duration) -> Self {
        Self {
            typing_expiry,
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a (tenant, conversation) pair to a room key. Pure; the only
    /// constructor used by the handlers, so every room reference is
    /// tenant-scoped by construction.
    pub fn resolve(tenant_id: TenantId, conversation_id: ConversationId) -> RoomKey {
        RoomKey {
            tenant_id,
            conversation_id,
        }
    }

    /// Get or lazily create the namespace for a tenant.
    pub async fn namespace(&self, tenant_id: TenantId) -> Arc<TenantNamespace> {
        {
            let namespaces = self.namespaces.read().await;
            if let Some(ns) = namespaces.get(&tenant_id) {
                return ns.clone();
            }
        }
        let mut namespaces = self.namespaces.write().await;
        namespaces
            .entry(tenant_id)
            .or_insert_with(|| Arc::new(TenantNamespace::new(tenant_id, self.typing_expiry)))
            .clone()
    }

    async fn existing(&self, tenant_id: TenantId) -> Option<Arc<TenantNamespace>> {
        self.namespaces.read().await.get(&tenant_id).cloned()
    }

    /// Deliver a frame to every member of the room, skipping `exclude`.
    /// A room in a tenant with no namespace yet has no members: delivers to 0.
    pub async fn broadcast_to_room(
        &self,
        key: RoomKey,
        frame: OutboundFrame,
        exclude: Option<ConnectionId>,
    ) -> usize {
        match self.existing(key.tenant_id).await {
            Some(ns) => ns.broadcast_to_room(key, frame, exclude).await,
            None => 0,
        }
    }

    /// Deliver a frame to every connected client of a tenant.
    pub async fn broadcast_to_tenant(&self, tenant_id: TenantId, frame: OutboundFrame) -> usize {
        match self.existing(tenant_id).await {
            Some(ns) => ns.broadcast_to_all(frame).await,
            None => 0,
        }
    }

    pub async fn stats(&self) -> BrokerStats {
        let namespaces: Vec<Arc<TenantNamespace>> =
            self.namespaces.read().await.values().cloned().collect();
        let mut stats = BrokerStats::default();
        for ns in namespaces {
            let ns_stats = ns.stats().await;
            stats.total_connections += ns_stats.students + ns_stats.instructors;
            stats.total_rooms += ns_stats.rooms;
            stats.total_typers += ns_stats.typers;
            stats.tenants.insert(ns.tenant_id(), ns_stats);
        }
        stats
    }

    pub async fn connected_clients(&self) -> Vec<ClientSnapshot> {
        let namespaces: Vec<Arc<TenantNamespace>> =
            self.namespaces.read().await.values().cloned().collect();
        let mut clients = Vec::new();
        for ns in namespaces {
            clients.extend(ns.client_snapshots().await);
        }
        clients
    }
}
