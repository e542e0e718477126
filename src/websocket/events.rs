use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::broker::connection::OutboundFrame;
use crate::broker::namespace::TenantNamespace;
use crate::broker::types::{ConnectionId, Identity, RoomKey};
use crate::models::{
    ChatMessage, ClientEvent, MessagesReadData, ReadReceipt, Sender, TestMessageData,
    TypingStatusData, TypingStatusEvent, EVENT_MESSAGES_READ, EVENT_NEW_MESSAGE,
    EVENT_TYPING_STATUS,
};

/// Upstream message id stamped on socket-originated test messages.
const TEST_MESSAGE_ID: i64 = 999;

/// Build the data payload of an error acknowledgment.
pub fn error_ack(event: Option<&str>, error: String) -> Value {
    match event {
        Some(event) => json!({ "for": event, "success": false, "error": error }),
        None => json!({ "success": false, "error": error }),
    }
}

fn success_ack(event: &str) -> Value {
    json!({ "for": event, "success": true })
}

/// Dispatch one inbound socket event and produce its acknowledgment payload.
///
/// Validation failures are reported through the ack and never disconnect the
/// socket. The match is exhaustive: a new event kind will not compile until
/// it is handled here.
pub async fn handle_client_event(
    namespace: &Arc<TenantNamespace>,
    connection_id: ConnectionId,
    identity: &Identity,
    event: ClientEvent,
) -> Value {
    let name = event.name();

    // Every inbound event targets a conversation; reject non-positive ids
    // here so the socket surface validates like the HTTP gateway.
    let conversation_id = match &event {
        ClientEvent::JoinConversation(data) => data.conversation_id,
        ClientEvent::LeaveRoom(data) => data.conversation_id,
        ClientEvent::TypingStatus(data) => data.conversation_id,
        ClientEvent::MessagesRead(data) => data.conversation_id,
        ClientEvent::TestMessage(data) => data.conversation_id,
    };
    if conversation_id <= 0 {
        return error_ack(Some(name), "Missing conversation_id".to_string());
    }

    match event {
        ClientEvent::JoinConversation(data) => {
            let key = RoomKey {
                tenant_id: identity.tenant_id,
                conversation_id: data.conversation_id,
            };
            match namespace.join(connection_id, data.conversation_id).await {
                Some(_member_count) => json!({
                    "for": name,
                    "success": true,
                    "conversation_id": data.conversation_id,
                    "room": key.name(),
                }),
                None => error_ack(Some(name), "Client not found".to_string()),
            }
        }
        ClientEvent::LeaveRoom(data) => {
            namespace.leave(connection_id, data.conversation_id).await;
            json!({
                "for": name,
                "success": true,
                "conversation_id": data.conversation_id,
            })
        }
        ClientEvent::TypingStatus(data) => {
            handle_typing_status(namespace, connection_id, identity, data).await
        }
        ClientEvent::MessagesRead(data) => {
            handle_messages_read(namespace, connection_id, identity, data).await
        }
        ClientEvent::TestMessage(data) => {
            handle_test_message(namespace, identity, data).await
        }
    }
}

async fn handle_typing_status(
    namespace: &Arc<TenantNamespace>,
    connection_id: ConnectionId,
    identity: &Identity,
    data: TypingStatusData,
) -> Value {
    let user_id = data.user_id.unwrap_or(identity.user_id);
    let is_student = data.is_student.unwrap_or(identity.role.is_student());

    let typing_users = namespace
        .set_typing(data.conversation_id, user_id, is_student, data.is_typing)
        .await;

    let event = TypingStatusEvent {
        conversation_id: data.conversation_id,
        tenant_id: identity.tenant_id,
        typing_users,
    };
    let payload = match serde_json::to_value(&event) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Failed to serialize typing payload: {}", e);
            return error_ack(Some(EVENT_TYPING_STATUS), "Failed to update typing status".to_string());
        }
    };

    // Relay to everyone in the room except the sender
    let key = RoomKey {
        tenant_id: identity.tenant_id,
        conversation_id: data.conversation_id,
    };
    namespace
        .broadcast_to_room(
            key,
            OutboundFrame::new(EVENT_TYPING_STATUS, payload),
            Some(connection_id),
        )
        .await;

    success_ack(EVENT_TYPING_STATUS)
}

async fn handle_messages_read(
    namespace: &Arc<TenantNamespace>,
    connection_id: ConnectionId,
    identity: &Identity,
    data: MessagesReadData,
) -> Value {
    let receipt = ReadReceipt {
        conversation_id: data.conversation_id,
        tenant_id: identity.tenant_id,
        user_id: data.user_id.unwrap_or(identity.user_id),
        is_student: data.is_student.unwrap_or(identity.role.is_student()),
    };
    let payload = match serde_json::to_value(&receipt) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Failed to serialize read receipt: {}", e);
            return error_ack(Some(EVENT_MESSAGES_READ), "Failed to update read status".to_string());
        }
    };

    // Relay to everyone in the room except the sender
    let key = RoomKey {
        tenant_id: identity.tenant_id,
        conversation_id: data.conversation_id,
    };
    namespace
        .broadcast_to_room(
            key,
            OutboundFrame::new(EVENT_MESSAGES_READ, payload),
            Some(connection_id),
        )
        .await;

    success_ack(EVENT_MESSAGES_READ)
}

/// Debug/dev path: inject a message straight from a socket, bypassing the
/// HTTP gateway. The sender receives its own echo, which is what the debug
/// consoles expect.
async fn handle_test_message(
    namespace: &Arc<TenantNamespace>,
    identity: &Identity,
    data: TestMessageData,
) -> Value {
    let message = ChatMessage {
        id: Some(TEST_MESSAGE_ID),
        content: data.content.unwrap_or_else(|| "Test message".to_string()),
        message_type: data.message_type,
        attachment_url: data.attachment_url,
        sent_at: Utc::now().to_rfc3339(),
        sender: Sender {
            id: data.user_id.unwrap_or(identity.user_id),
            is_student: data.is_student.unwrap_or(identity.role.is_student()),
        },
        conversation_id: data.conversation_id,
        tenant_id: identity.tenant_id,
    };
    let payload = match serde_json::to_value(&message) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Failed to serialize test message: {}", e);
            return error_ack(Some("test_message"), "Failed to send test message".to_string());
        }
    };

    let key = RoomKey {
        tenant_id: identity.tenant_id,
        conversation_id: data.conversation_id,
    };
    namespace
        .broadcast_to_room(key, OutboundFrame::new(EVENT_NEW_MESSAGE, payload.clone()), None)
        .await;
    info!(
        "Test message sent to conversation {} in tenant {}",
        data.conversation_id, identity.tenant_id
    );

    json!({ "for": "test_message", "success": true, "message": payload })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::connection::ConnectionHandle;
    use crate::broker::types::Role;
    use crate::broker::Broker;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;
    use uuid::Uuid;

    async fn connect(
        broker: &Broker,
        tenant_id: i64,
        user_id: i64,
    ) -> (
        Arc<TenantNamespace>,
        ConnectionId,
        Identity,
        UnboundedReceiver<OutboundFrame>,
    ) {
        let id = Uuid::new_v4();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let identity = Identity {
            tenant_id,
            user_id,
            role: Role::Student,
        };
        let ns = broker.namespace(tenant_id).await;
        ns.register(ConnectionHandle::new(id, identity.clone(), tx))
            .await;
        (ns, id, identity, rx)
    }

    #[tokio::test]
    async fn double_join_acks_success_and_counts_once() {
        let broker = Broker::new(Duration::from_secs(10));
        let (ns, id, identity, _rx) = connect(&broker, 1, 101).await;

        let join = ClientEvent::JoinConversation(crate::models::JoinConversationData {
            conversation_id: 1,
        });
        let ack = handle_client_event(&ns, id, &identity, join).await;
        assert_eq!(ack["success"], true);
        assert_eq!(ack["room"], "tenant_1_conversation_1");

        let join = ClientEvent::JoinConversation(crate::models::JoinConversationData {
            conversation_id: 1,
        });
        let ack = handle_client_event(&ns, id, &identity, join).await;
        assert_eq!(ack["success"], true);

        assert_eq!(ns.join(id, 1).await, Some(1));
    }

    #[tokio::test]
    async fn non_positive_conversation_id_is_an_error_ack_on_every_event() {
        let broker = Broker::new(Duration::from_secs(10));
        let (ns, id, identity, _rx) = connect(&broker, 1, 101).await;

        let join = ClientEvent::JoinConversation(crate::models::JoinConversationData {
            conversation_id: 0,
        });
        let ack = handle_client_event(&ns, id, &identity, join).await;
        assert_eq!(ack["success"], false);
        assert_eq!(ack["error"], "Missing conversation_id");
        // No room came into existence for the bad id
        assert_eq!(ns.stats().await.rooms, 0);

        let typing = ClientEvent::TypingStatus(crate::models::TypingStatusData {
            conversation_id: -3,
            user_id: None,
            is_student: None,
            is_typing: true,
        });
        let ack = handle_client_event(&ns, id, &identity, typing).await;
        assert_eq!(ack["success"], false);
        assert!(ns.current_typers(-3).await.is_empty());

        let test_message = ClientEvent::TestMessage(crate::models::TestMessageData {
            conversation_id: 0,
            content: Some("hi".to_string()),
            user_id: None,
            is_student: None,
            message_type: crate::models::MessageType::Text,
            attachment_url: None,
        });
        let ack = handle_client_event(&ns, id, &identity, test_message).await;
        assert_eq!(ack["success"], false);
    }

    #[tokio::test]
    async fn join_from_unregistered_connection_is_an_error_ack() {
        let broker = Broker::new(Duration::from_secs(10));
        let ns = broker.namespace(1).await;
        let identity = Identity {
            tenant_id: 1,
            user_id: 101,
            role: Role::Student,
        };

        let join = ClientEvent::JoinConversation(crate::models::JoinConversationData {
            conversation_id: 1,
        });
        let ack = handle_client_event(&ns, Uuid::new_v4(), &identity, join).await;
        assert_eq!(ack["success"], false);
        assert_eq!(ack["error"], "Client not found");
    }

    #[tokio::test]
    async fn test_message_reaches_roommates_but_not_other_tenants() {
        let broker = Broker::new(Duration::from_secs(10));
        let (ns, sender_id, sender_identity, mut sender_rx) = connect(&broker, 1, 101).await;
        let (_, receiver_id, _, mut receiver_rx) = connect(&broker, 1, 102).await;
        let (other_ns, other_id, _, mut other_rx) = connect(&broker, 2, 201).await;

        ns.join(sender_id, 5).await;
        ns.join(receiver_id, 5).await;
        other_ns.join(other_id, 5).await;

        let event = ClientEvent::TestMessage(crate::models::TestMessageData {
            conversation_id: 5,
            content: Some("hi".to_string()),
            user_id: None,
            is_student: None,
            message_type: crate::models::MessageType::Text,
            attachment_url: None,
        });
        let ack = handle_client_event(&ns, sender_id, &sender_identity, event).await;
        assert_eq!(ack["success"], true);

        let frame = receiver_rx.try_recv().unwrap();
        assert_eq!(frame.event, EVENT_NEW_MESSAGE);
        assert_eq!(frame.data["content"], "hi");
        assert_eq!(frame.data["sender"]["id"], 101);

        // test_message echoes back to the sender too
        assert!(sender_rx.try_recv().is_ok());

        // Tenant 2's conversation 5 is a different room entirely
        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn typing_status_broadcast_skips_sender() {
        let broker = Broker::new(Duration::from_secs(10));
        let (ns, sender_id, sender_identity, mut sender_rx) = connect(&broker, 1, 101).await;
        let (_, receiver_id, _, mut receiver_rx) = connect(&broker, 1, 102).await;
        ns.join(sender_id, 5).await;
        ns.join(receiver_id, 5).await;

        let event = ClientEvent::TypingStatus(crate::models::TypingStatusData {
            conversation_id: 5,
            user_id: None,
            is_student: None,
            is_typing: true,
        });
        let ack = handle_client_event(&ns, sender_id, &sender_identity, event).await;
        assert_eq!(ack["success"], true);

        let frame = receiver_rx.try_recv().unwrap();
        assert_eq!(frame.event, EVENT_TYPING_STATUS);
        assert_eq!(frame.data["typing_users"][0]["user_id"], 101);
        assert!(sender_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn messages_read_uses_connection_identity_by_default() {
        let broker = Broker::new(Duration::from_secs(10));
        let (ns, sender_id, sender_identity, _sender_rx) = connect(&broker, 1, 101).await;
        let (_, receiver_id, _, mut receiver_rx) = connect(&broker, 1, 102).await;
        ns.join(sender_id, 5).await;
        ns.join(receiver_id, 5).await;

        let event = ClientEvent::MessagesRead(crate::models::MessagesReadData {
            conversation_id: 5,
            user_id: None,
            is_student: None,
        });
        let ack = handle_client_event(&ns, sender_id, &sender_identity, event).await;
        assert_eq!(ack["success"], true);

        let frame = receiver_rx.try_recv().unwrap();
        assert_eq!(frame.event, EVENT_MESSAGES_READ);
        assert_eq!(frame.data["user_id"], 101);
        assert_eq!(frame.data["conversation_id"], 5);
    }

    #[tokio::test]
    async fn leave_of_unjoined_room_acks_success() {
        let broker = Broker::new(Duration::from_secs(10));
        let (ns, id, identity, _rx) = connect(&broker, 1, 101).await;

        let event = ClientEvent::LeaveRoom(crate::models::LeaveRoomData { conversation_id: 9 });
        let ack = handle_client_event(&ns, id, &identity, event).await;
        assert_eq!(ack["success"], true);
    }
}
