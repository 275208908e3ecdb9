//! Fan-out of chat and presence events to room members.
//!
//! Delivery pushes into each member's outbound queue: snapshot the member
//! list, release the room lock, then deliver. A failed push (the peer's
//! event loop already exited) is logged and skipped; it never aborts
//! delivery to the remaining members.

use std::sync::Arc;

use crate::auth::Identity;

use super::connection::{ChatConnection, EventSender};
use super::events::{ChatEvent, ServerEvent};
use super::registry::RoomRegistry;

/// The broadcast engine. Cloneable; stored in `AppState`.
#[derive(Clone)]
pub struct Broadcaster {
    rooms: Arc<RoomRegistry>,
}

impl Broadcaster {
    pub fn new(rooms: Arc<RoomRegistry>) -> Self {
        Self { rooms }
    }

    /// Announce a newly-joined connection.
    ///
    /// The order is fixed: welcome to the joiner, then the join
    /// announcement to the existing members, then a status update to the
    /// whole room — a client never sees a member list racing the
    /// announcement it belongs to.
    pub fn announce_join(&self, room: &str, joiner: &ChatConnection) {
        let welcome = ChatEvent::welcome(&joiner.identity.nick);
        deliver(&joiner.conn_id, &joiner.sender, welcome.payload);

        let announcement = ChatEvent::join(&joiner.identity.nick);
        self.trace(room, &announcement);
        for (conn_id, sender) in self.rooms.senders(room) {
            if conn_id != joiner.conn_id {
                deliver(&conn_id, &sender, announcement.payload.clone());
            }
        }

        self.announce_status(room);
    }

    /// Announce a departed member, then refresh the member list.
    pub fn announce_leave(&self, room: &str, identity: &Identity) {
        self.fan_out(room, ChatEvent::leave(&identity.nick));
        self.announce_status(room);
    }

    /// Relay a chat line verbatim to every member, the author included.
    pub fn relay_message(&self, room: &str, author: &Identity, text: &str) {
        self.fan_out(room, ChatEvent::message(&author.user_id, &author.nick, text));
    }

    /// Recompute the member nickname list and broadcast it to the room.
    pub fn announce_status(&self, room: &str) {
        self.fan_out(room, ChatEvent::status(self.rooms.nicknames(room)));
    }

    fn fan_out(&self, room: &str, event: ChatEvent) {
        self.trace(room, &event);
        for (conn_id, sender) in self.rooms.senders(room) {
            deliver(&conn_id, &sender, event.payload.clone());
        }
    }

    fn trace(&self, room: &str, event: &ChatEvent) {
        tracing::trace!(
            %room,
            kind = ?event.kind,
            author = event.author_id.as_deref().unwrap_or("system"),
            emitted_at = %event.emitted_at,
            "broadcasting event"
        );
    }
}

fn deliver(conn_id: &str, sender: &EventSender, payload: ServerEvent) {
    if sender.send(payload).is_err() {
        tracing::debug!(%conn_id, "dropping event for closed connection");
    }
}
