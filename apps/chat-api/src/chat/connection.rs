//! Per-connection state.

use tokio::sync::mpsc;

use crate::auth::Identity;

use super::events::ServerEvent;

/// Sender half of a connection's outbound event queue.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// State for a single socket connection.
///
/// Exists only once the handshake has authenticated; the identity is
/// attached for the connection's whole life.
pub struct ChatConnection {
    /// Unique connection identifier (`conn_` prefixed ULID).
    pub conn_id: String,
    /// The identity resolved at handshake time.
    pub identity: Identity,
    /// Queue the broadcast engine pushes this connection's events into.
    pub sender: EventSender,
}

impl ChatConnection {
    pub fn new(identity: Identity, sender: EventSender) -> Self {
        Self {
            conn_id: chatmachine_common::id::prefixed_ulid(chatmachine_common::id::prefix::CONNECTION),
            identity,
            sender,
        }
    }
}
