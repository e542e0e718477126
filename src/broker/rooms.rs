use std::collections::{HashMap, HashSet};

use super::types::{ConnectionId, ConversationId};

/// Membership table for one tenant namespace.
///
/// Rooms are created lazily on first join and dropped when the last member
/// leaves; an empty room and a nonexistent room are the same thing, so
/// re-joining after a room emptied out is always safe.
#[derive(Debug, Default)]
pub struct RoomTable {
    rooms: HashMap<ConversationId, HashSet<ConnectionId>>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room, creating the room if needed. Idempotent:
    /// joining twice is a no-op. Returns the member count after the join.
    pub fn join(&mut self, conversation_id: ConversationId, connection_id: ConnectionId) -> usize {
        let members = self.rooms.entry(conversation_id).or_default();
        members.insert(connection_id);
        members.len()
    }

    /// Remove a connection from a room. Idempotent: leaving a room the
    /// connection never joined is not an error.
    pub fn leave(&mut self, conversation_id: ConversationId, connection_id: ConnectionId) {
        if let Some(members) = self.rooms.get_mut(&conversation_id) {
            members.remove(&connection_id);
            if members.is_empty() {
                self.rooms.remove(&conversation_id);
            }
        }
    }

    /// Remove a connection from every room it was a member of.
    pub fn remove_connection(&mut self, connection_id: ConnectionId) {
        self.rooms.retain(|_, members| {
            members.remove(&connection_id);
            !members.is_empty()
        });
    }

    /// Snapshot of the member ids of a room. Empty for unknown rooms.
    pub fn members_of(&self, conversation_id: ConversationId) -> Vec<ConnectionId> {
        self.rooms
            .get(&conversation_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, conversation_id: ConversationId, connection_id: ConnectionId) -> bool {
        self.rooms
            .get(&conversation_id)
            .is_some_and(|members| members.contains(&connection_id))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
