use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use super::types::{ConnectionId, Identity};

/// A single outbound event frame: `{"event": ..., "data": {...}}`.
///
/// Inbound frames are a closed tagged enum (see `models::messages`); outbound
/// frames stay open-ended because `/emit` can relay arbitrary event names.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundFrame {
    pub event: String,
    pub data: Value,
}

impl OutboundFrame {
    pub fn new(event: &str, data: Value) -> Self {
        Self {
            event: event.to_string(),
            data,
        }
    }
}

/// Handle to a live connection, held by the room membership table.
///
/// The sender side of the connection's outbound queue. Queueing a frame never
/// touches the socket; the connection's writer task drains the queue, so a
/// slow client cannot stall whoever is broadcasting.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub identity: Identity,
    tx: UnboundedSender<OutboundFrame>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, identity: Identity, tx: UnboundedSender<OutboundFrame>) -> Self {
        Self { id, identity, tx }
    }

    /// Queue a frame for delivery. Returns false if the connection is already
    /// gone; delivery to a dead connection is a silent no-op.
    pub fn send(&self, frame: OutboundFrame) -> bool {
        self.tx.send(frame).is_ok()
    }
}
