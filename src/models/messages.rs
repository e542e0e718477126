use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::broker::types::{ConversationId, TenantId, UserId};
use crate::broker::typing::Typer;

// Server -> client event names.
pub const EVENT_NEW_MESSAGE: &str = "new_message";
pub const EVENT_TYPING_STATUS: &str = "typing_status";
pub const EVENT_MESSAGES_READ: &str = "messages_read";

/// Kind of chat message being relayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    Video,
    Audio,
}

/// Message sender as seen by clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Sender {
    pub id: UserId,
    pub is_student: bool,
}

/// The `new_message` payload. Relay-only: built per broadcast, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    /// Upstream message id, when the upstream application assigned one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub attachment_url: Option<String>,
    /// Server-assigned RFC 3339 timestamp.
    pub sent_at: String,
    pub sender: Sender,
    pub conversation_id: ConversationId,
    pub tenant_id: TenantId,
}

/// The `typing_status` payload: the full refreshed typing set for the room.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TypingStatusEvent {
    pub conversation_id: ConversationId,
    pub tenant_id: TenantId,
    pub typing_users: Vec<Typer>,
}

/// The `messages_read` payload: who read, in which conversation. Which
/// individual messages were read is tracked upstream, not here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReadReceipt {
    pub conversation_id: ConversationId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub is_student: bool,
}

/// Inbound socket frames, tagged by event name.
///
/// A closed enum rather than a string-keyed dispatch table: adding or
/// removing an event kind is a compile-time-checked change, and the
/// handler's match is exhaustive.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "join_conversation")]
    JoinConversation(JoinConversationData),
    #[serde(rename = "leave_room")]
    LeaveRoom(LeaveRoomData),
    #[serde(rename = "typing_status")]
    TypingStatus(TypingStatusData),
    #[serde(rename = "messages_read")]
    MessagesRead(MessagesReadData),
    #[serde(rename = "test_message")]
    TestMessage(TestMessageData),
}

impl ClientEvent {
    /// The event name echoed back in the acknowledgment frame.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinConversation(_) => "join_conversation",
            ClientEvent::LeaveRoom(_) => "leave_room",
            ClientEvent::TypingStatus(_) => EVENT_TYPING_STATUS,
            ClientEvent::MessagesRead(_) => EVENT_MESSAGES_READ,
            ClientEvent::TestMessage(_) => "test_message",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JoinConversationData {
    pub conversation_id: ConversationId,
}

#[derive(Debug, Deserialize)]
pub struct LeaveRoomData {
    pub conversation_id: ConversationId,
}

/// Socket-originated typing update. `user_id`/`is_student` default to the
/// connection's own identity when the client omits them.
#[derive(Debug, Deserialize)]
pub struct TypingStatusData {
    pub conversation_id: ConversationId,
    pub user_id: Option<UserId>,
    pub is_student: Option<bool>,
    #[serde(default = "default_true")]
    pub is_typing: bool,
}

#[derive(Debug, Deserialize)]
pub struct MessagesReadData {
    pub conversation_id: ConversationId,
    pub user_id: Option<UserId>,
    pub is_student: Option<bool>,
}

/// Debug/dev path: a message injected directly from a socket instead of the
/// HTTP gateway. Deliberately retained for local testing.
#[derive(Debug, Deserialize)]
pub struct TestMessageData {
    pub conversation_id: ConversationId,
    pub content: Option<String>,
    pub user_id: Option<UserId>,
    pub is_student: Option<bool>,
    #[serde(rename = "type", default)]
    pub message_type: MessageType,
    pub attachment_url: Option<String>,
}

fn default_true() -> bool {
    true
}
