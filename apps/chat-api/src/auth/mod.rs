pub mod cookie;
pub mod handshake;

pub use handshake::Identity;
