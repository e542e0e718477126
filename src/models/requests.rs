use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::messages::MessageType;
use crate::broker::types::{ConversationId, TenantId, UserId};

/// Body of POST /send-message, pushed by the upstream application.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SendMessageRequest {
    /// Upstream message id, echoed into the broadcast payload.
    pub message_id: Option<i64>,
    pub conversation_id: ConversationId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub is_student: bool,
    pub content: String,
    #[serde(rename = "type", default)]
    pub message_type: MessageType,
    pub attachment_url: Option<String>,
}

/// Body of POST /typing-status.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TypingStatusRequest {
    pub conversation_id: ConversationId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub is_student: bool,
    #[serde(default = "default_true")]
    pub is_typing: bool,
}

/// Body of POST /mark-read.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MarkReadRequest {
    pub conversation_id: ConversationId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub is_student: bool,
}

/// Body of POST /emit: an arbitrary named event for a conversation room,
/// or for every connected client of the tenant when no conversation is given.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EmitEventRequest {
    pub event: String,
    #[schema(value_type = Object)]
    pub data: Value,
    pub tenant_id: TenantId,
    pub conversation_id: Option<ConversationId>,
}

fn default_true() -> bool {
    true
}
