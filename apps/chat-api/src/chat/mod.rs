pub mod broadcast;
pub mod connection;
pub mod events;
pub mod registry;
pub mod server;
