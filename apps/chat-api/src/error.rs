use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Failure reaching one of the external directories (session or user store).
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory backend unavailable: {0}")]
    Unavailable(String),
}

/// Why a socket handshake was refused.
///
/// Every variant is fatal to the connection attempt: the transport is
/// answered with a plain HTTP 401 and never promoted to a socket. A client
/// hitting a transient directory failure may simply retry the handshake.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("missing or invalid session cookie signature")]
    InvalidSignature,
    #[error("no session found for the presented cookie")]
    SessionNotFound,
    #[error("session user not found in the user directory")]
    UserNotFound,
}

impl IntoResponse for AuthFailure {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": "HANDSHAKE_REJECTED",
                "message": self.to_string()
            }
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}
