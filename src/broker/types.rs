use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant identifier, assigned by the upstream application.
pub type TenantId = i64;

/// Conversation identifier, assigned by the upstream application.
pub type ConversationId = i64;

/// User identifier, assigned by the upstream application.
pub type UserId = i64;

/// Server-generated identifier for a live socket session.
pub type ConnectionId = Uuid;

/// A tenant-scoped room address.
///
/// Every membership and broadcast operation takes a `RoomKey`, so a room
/// reference that does not carry its tenant cannot be constructed. Two tenants
/// may use the same conversation id without ever sharing a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomKey {
    pub tenant_id: TenantId,
    pub conversation_id: ConversationId,
}

impl RoomKey {
    /// The wire-visible room name, echoed back in join acknowledgments.
    pub fn name(&self) -> String {
        format!(
            "tenant_{}_conversation_{}",
            self.tenant_id, self.conversation_id
        )
    }
}

/// Whether a participant is a student or an instructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
}

impl Role {
    pub fn from_is_student(is_student: bool) -> Self {
        if is_student {
            Role::Student
        } else {
            Role::Instructor
        }
    }

    pub fn is_student(&self) -> bool {
        matches!(self, Role::Student)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
        }
    }
}

/// Authenticated identity bound to a connection at handshake time.
///
/// Trusted for the lifetime of the connection, never re-validated.
#[derive(Debug, Clone)]
pub struct Identity {
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub role: Role,
}
