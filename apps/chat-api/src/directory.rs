//! External directories consumed read-only by the chat core.
//!
//! The session store is owned by the HTTP layer; the chat core reads a
//! record exactly once, at handshake time, and never writes. The user store
//! is the profile directory keyed by the stable user id.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::DirectoryError;

/// A record in the shared HTTP session store.
///
/// The HTTP layer keeps more fields in a session than the chat core ever
/// looks at; only the authenticated user id is modeled here.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub user_id: String,
}

/// Profile fields exposed by the user store.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub nick: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub picture: Option<String>,
}

/// Abstraction over the shared session store.
///
/// Backed by the HTTP layer's session database in production and an
/// in-memory map in tests.
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, DirectoryError>;
}

/// Abstraction over the user profile store.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserProfile>, DirectoryError>;
}

// ---------------------------------------------------------------------------
// In-memory implementations (for local runs / tests)
// ---------------------------------------------------------------------------

pub struct MemorySessionDirectory {
    sessions: Mutex<HashMap<String, SessionRecord>>,
}

impl MemorySessionDirectory {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, session_id: impl Into<String>, user_id: impl Into<String>) {
        self.sessions.lock().unwrap().insert(
            session_id.into(),
            SessionRecord {
                user_id: user_id.into(),
            },
        );
    }

    pub fn remove(&self, session_id: &str) {
        self.sessions.lock().unwrap().remove(session_id);
    }
}

impl Default for MemorySessionDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionDirectory for MemorySessionDirectory {
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, DirectoryError> {
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }
}

pub struct MemoryUserDirectory {
    users: Mutex<HashMap<String, UserProfile>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, user_id: impl Into<String>, profile: UserProfile) {
        self.users.lock().unwrap().insert(user_id.into(), profile);
    }

    pub fn remove(&self, user_id: &str) {
        self.users.lock().unwrap().remove(user_id);
    }
}

impl Default for MemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserProfile>, DirectoryError> {
        Ok(self.users.lock().unwrap().get(user_id).cloned())
    }
}
