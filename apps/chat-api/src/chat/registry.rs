//! Authoritative in-memory room membership.
//!
//! Uses `DashMap` for shard-level concurrency across rooms and a
//! `parking_lot::Mutex` per room so joins and leaves on one room are
//! linearized. Reads hand out snapshots, never live views.

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::auth::Identity;

use super::connection::{ChatConnection, EventSender};

/// One member of a room: the connection's identity plus the outbound queue
/// used to reach it.
struct RoomMember {
    conn_id: String,
    identity: Identity,
    sender: EventSender,
}

/// Per-room state. Members stay in join order so snapshots are
/// deterministic for a given membership set.
#[derive(Default)]
struct RoomState {
    members: Vec<RoomMember>,
}

/// The record of which connections are currently in which room.
///
/// A connection appears in a room's member set iff it authenticated, joined
/// that room, and has not yet disconnected.
pub struct RoomRegistry {
    rooms: DashMap<String, Mutex<RoomState>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Add a connection to a room. Joining twice is a no-op.
    pub fn join(&self, room: &str, conn: &ChatConnection) {
        let entry = self
            .rooms
            .entry(room.to_string())
            .or_insert_with(|| Mutex::new(RoomState::default()));
        let mut state = entry.lock();
        if state.members.iter().any(|m| m.conn_id == conn.conn_id) {
            return;
        }
        state.members.push(RoomMember {
            conn_id: conn.conn_id.clone(),
            identity: conn.identity.clone(),
            sender: conn.sender.clone(),
        });
    }

    /// Remove a connection from a room.
    ///
    /// Returns the removed member's identity, or `None` if it was not a
    /// member. The `None` case makes double-leave (and double-close) a
    /// no-op for callers broadcasting departure.
    pub fn leave(&self, room: &str, conn_id: &str) -> Option<Identity> {
        let entry = self.rooms.get(room)?;
        let mut state = entry.lock();
        let pos = state.members.iter().position(|m| m.conn_id == conn_id)?;
        Some(state.members.remove(pos).identity)
    }

    /// Point-in-time snapshot of a room's member identities, in join order.
    pub fn members(&self, room: &str) -> Vec<Identity> {
        self.rooms
            .get(room)
            .map(|entry| {
                entry
                    .lock()
                    .members
                    .iter()
                    .map(|m| m.identity.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Current member nicknames, in join order.
    pub fn nicknames(&self, room: &str) -> Vec<String> {
        self.rooms
            .get(room)
            .map(|entry| {
                entry
                    .lock()
                    .members
                    .iter()
                    .map(|m| m.identity.nick.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Snapshot of member outbound queues for fan-out.
    ///
    /// The room lock is released before the caller performs any delivery.
    pub(crate) fn senders(&self, room: &str) -> Vec<(String, EventSender)> {
        self.rooms
            .get(room)
            .map(|entry| {
                entry
                    .lock()
                    .members
                    .iter()
                    .map(|m| (m.conn_id.clone(), m.sender.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
