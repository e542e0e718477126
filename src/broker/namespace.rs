use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::connection::{ConnectionHandle, OutboundFrame};
use super::rooms::RoomTable;
use super::types::{ConnectionId, ConversationId, Role, RoomKey, TenantId, UserId};
use super::typing::{Typer, TypingTracker};

/// Aggregate counters for one tenant, reported by the status endpoints.
#[derive(Debug, Clone, Default)]
pub struct NamespaceStats {
    pub students: usize,
    pub instructors: usize,
    pub rooms: usize,
    pub typers: usize,
}

/// One connection's view for the connected-clients listing.
#[derive(Debug, Clone)]
pub struct ClientSnapshot {
    pub connection_id: ConnectionId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub role: Role,
    pub rooms: Vec<String>,
}

struct ConnectionEntry {
    handle: ConnectionHandle,
    joined: HashSet<ConversationId>,
}

struct NamespaceState {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    rooms: RoomTable,
    typing: TypingTracker,
}

/// All mutable state for one tenant: its connection registry, room membership
/// table and typing tracker, behind a single lock.
///
/// One lock per tenant means tenants never contend with each other. Nothing
/// under this lock performs I/O: broadcasts only push frames onto unbounded
/// per-connection queues, and the actual socket writes happen in each
/// connection's writer task.
pub struct TenantNamespace {
    tenant_id: TenantId,
    inner: Mutex<NamespaceState>,
}

impl TenantNamespace {
    pub fn new(tenant_id: TenantId, typing_expiry: Duration) -> Self {
        Self {
            tenant_id,
            inner: Mutex::new(NamespaceState {
                connections: HashMap::new(),
                rooms: RoomTable::new(),
                typing: TypingTracker::new(typing_expiry),
            }),
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Register an authenticated connection with the namespace.
    pub async fn register(&self, handle: ConnectionHandle) {
        let mut state = self.inner.lock().await;
        info!(
            "Client connected: {} (User ID: {}, Tenant ID: {}, Type: {})",
            handle.id,
            handle.identity.user_id,
            self.tenant_id,
            handle.identity.role.as_str()
        );
        state.connections.insert(
            handle.id,
            ConnectionEntry {
                handle,
                joined: HashSet::new(),
            },
        );
    }

    /// Tear down a connection: remove it from every room it joined and clear
    /// its user's typing entries in those conversations. Called exactly once
    /// per connection; safe for connections that never joined anything.
    pub async fn deregister(&self, connection_id: ConnectionId) {
        let mut state = self.inner.lock().await;
        let Some(entry) = state.connections.remove(&connection_id) else {
            return;
        };
        let user_id = entry.handle.identity.user_id;
        for conversation_id in &entry.joined {
            state.typing.clear_user(*conversation_id, user_id);
        }
        state.rooms.remove_connection(connection_id);
        info!(
            "Client disconnected: {} (Tenant ID: {})",
            connection_id, self.tenant_id
        );
    }

    /// Join a conversation room. Idempotent. Returns the member count after
    /// the join, or `None` if the connection is not registered here.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        conversation_id: ConversationId,
    ) -> Option<usize> {
        let mut state = self.inner.lock().await;
        if !state.connections.contains_key(&connection_id) {
            return None;
        }
        let member_count = state.rooms.join(conversation_id, connection_id);
        if let Some(entry) = state.connections.get_mut(&connection_id) {
            entry.joined.insert(conversation_id);
        }
        info!(
            "Client {} joined conversation {} in tenant {}",
            connection_id, conversation_id, self.tenant_id
        );
        Some(member_count)
    }

    /// Leave a conversation room. Idempotent; leaving an unjoined room is ok.
    pub async fn leave(&self, connection_id: ConnectionId, conversation_id: ConversationId) {
        let mut state = self.inner.lock().await;
        state.rooms.leave(conversation_id, connection_id);
        if let Some(entry) = state.connections.get_mut(&connection_id) {
            entry.joined.remove(&conversation_id);
        }
        info!(
            "Client {} left conversation {} in tenant {}",
            connection_id, conversation_id, self.tenant_id
        );
    }

    /// Upsert a typing flag and return the refreshed non-expired typing set.
    pub async fn set_typing(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
        is_student: bool,
        is_typing: bool,
    ) -> Vec<Typer> {
        let mut state = self.inner.lock().await;
        state
            .typing
            .set_typing(conversation_id, user_id, is_student, is_typing)
    }

    /// The non-expired typing set for a conversation.
    pub async fn current_typers(&self, conversation_id: ConversationId) -> Vec<Typer> {
        let state = self.inner.lock().await;
        state.typing.current_typers(conversation_id)
    }

    /// Deliver a frame to every member of a room, optionally skipping the
    /// sender's own connection. Returns the number of live connections the
    /// frame was queued for; dead connections are skipped silently.
    pub async fn broadcast_to_room(
        &self,
        key: RoomKey,
        frame: OutboundFrame,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let state = self.inner.lock().await;
        let mut delivered = 0;
        for member_id in state.rooms.members_of(key.conversation_id) {
            if Some(member_id) == exclude {
                continue;
            }
            if let Some(entry) = state.connections.get(&member_id) {
                if entry.handle.send(frame.clone()) {
                    delivered += 1;
                }
            }
        }
        debug!(
            "Delivered '{}' to {} member(s) of {}",
            frame.event,
            delivered,
            key.name()
        );
        delivered
    }

    /// Deliver a frame to every connection in the namespace, regardless of
    /// room membership. Used by `/emit` when no conversation is targeted.
    pub async fn broadcast_to_all(&self, frame: OutboundFrame) -> usize {
        let state = self.inner.lock().await;
        let mut delivered = 0;
        for entry in state.connections.values() {
            if entry.handle.send(frame.clone()) {
                delivered += 1;
            }
        }
        delivered
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.lock().await.connections.len()
    }

    pub async fn stats(&self) -> NamespaceStats {
        let state = self.inner.lock().await;
        let mut stats = NamespaceStats {
            rooms: state.rooms.room_count(),
            typers: state.typing.active_count(),
            ..Default::default()
        };
        for entry in state.connections.values() {
            match entry.handle.identity.role {
                Role::Student => stats.students += 1,
                Role::Instructor => stats.instructors += 1,
            }
        }
        stats
    }

    pub async fn client_snapshots(&self) -> Vec<ClientSnapshot> {
        let state = self.inner.lock().await;
        state
            .connections
            .values()
            .map(|entry| ClientSnapshot {
                connection_id: entry.handle.id,
                tenant_id: self.tenant_id,
                user_id: entry.handle.identity.user_id,
                role: entry.handle.identity.role,
                rooms: entry
                    .joined
                    .iter()
                    .map(|conversation_id| {
                        RoomKey {
                            tenant_id: self.tenant_id,
                            conversation_id: *conversation_id,
                        }
                        .name()
                    })
                    .collect(),
            })
            .collect()
    }
}
