//! Wire events and the chat-event record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author name attached to server-generated events.
pub const SYSTEM_USER: &str = "system";

/// A message received from a client over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Relay a chat line to the room.
    Send { message: String },
    /// Ask for a fresh member-list broadcast.
    GetStatus {},
}

/// A message sent from the server to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ChatMessage { message: String, user: String },
    StatusUpdate { userlist: Vec<String> },
}

/// What kind of event the broadcast engine emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Message,
    Join,
    Leave,
    Status,
}

/// An immutable record of one emitted event. Never mutated, never persisted.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub kind: EventKind,
    /// Authoring user id; `None` for system-generated events.
    pub author_id: Option<String>,
    /// The frame delivered to recipients.
    pub payload: ServerEvent,
    pub emitted_at: DateTime<Utc>,
}

impl ChatEvent {
    /// A user's chat line, echoed verbatim and tagged with their nickname.
    pub fn message(author_id: &str, nick: &str, text: &str) -> Self {
        Self {
            kind: EventKind::Message,
            author_id: Some(author_id.to_string()),
            payload: ServerEvent::ChatMessage {
                message: text.to_string(),
                user: nick.to_string(),
            },
            emitted_at: Utc::now(),
        }
    }

    /// The private greeting delivered only to a joining connection.
    pub fn welcome(nick: &str) -> Self {
        Self::system(
            EventKind::Join,
            format!("Welcome to the chat machine, {nick}."),
        )
    }

    /// The room-wide announcement that a member joined.
    pub fn join(nick: &str) -> Self {
        Self::system(EventKind::Join, format!("{nick} has entered chat."))
    }

    /// The room-wide announcement that a member left.
    pub fn leave(nick: &str) -> Self {
        Self::system(EventKind::Leave, format!("{nick} has left chat."))
    }

    /// The current member nickname list.
    pub fn status(userlist: Vec<String>) -> Self {
        Self {
            kind: EventKind::Status,
            author_id: None,
            payload: ServerEvent::StatusUpdate { userlist },
            emitted_at: Utc::now(),
        }
    }

    fn system(kind: EventKind, message: String) -> Self {
        Self {
            kind,
            author_id: None,
            payload: ServerEvent::ChatMessage {
                message,
                user: SYSTEM_USER.to_string(),
            },
            emitted_at: Utc::now(),
        }
    }
}
