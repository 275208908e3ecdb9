pub mod auth;
pub mod chat;
pub mod config;
pub mod directory;
pub mod error;
pub mod routes;

use std::sync::Arc;

use chat::broadcast::Broadcaster;
use chat::registry::RoomRegistry;
use config::Config;
use directory::{SessionDirectory, UserDirectory};

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionDirectory>,
    pub users: Arc<dyn UserDirectory>,
    pub rooms: Arc<RoomRegistry>,
    pub broadcast: Broadcaster,
    pub config: Arc<Config>,
}
