//! Socket handshake authentication against the shared HTTP session.
//!
//! Runs exactly once per connection, before the transport is promoted. The
//! session is never re-validated afterwards: a connection stays trusted for
//! its lifetime even if the HTTP session is revoked while it is open.

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};

use crate::error::AuthFailure;
use crate::AppState;

use super::cookie;

/// The authenticated, connection-scoped identity.
///
/// Derived once at handshake time from the session record and the user's
/// profile; immutable for the life of the connection. Absent optional
/// profile fields collapse to the empty string.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub nick: String,
    pub name: String,
    pub location: String,
    pub picture: String,
    pub connected_at: DateTime<Utc>,
}

/// Authenticate an inbound socket handshake.
///
/// Recovers the session id from the signed cookie, resolves it through the
/// session directory, then resolves the session's user through the user
/// directory. Read-only against both; any failure rejects the handshake.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Identity, AuthFailure> {
    let header = headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthFailure::InvalidSignature)?;

    let raw = cookie::find_cookie(header, &state.config.session_cookie)
        .ok_or(AuthFailure::InvalidSignature)?;
    let session_id =
        cookie::unsign(raw, &state.config.session_secret).ok_or(AuthFailure::InvalidSignature)?;

    let record = state
        .sessions
        .get(&session_id)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "session directory lookup failed");
            AuthFailure::SessionNotFound
        })?
        .ok_or(AuthFailure::SessionNotFound)?;

    let profile = state
        .users
        .find_by_id(&record.user_id)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "user directory lookup failed");
            AuthFailure::UserNotFound
        })?
        .ok_or(AuthFailure::UserNotFound)?;

    Ok(Identity {
        user_id: record.user_id,
        nick: profile.nick.unwrap_or_default(),
        name: profile.name.unwrap_or_default(),
        location: profile.location.unwrap_or_default(),
        picture: profile.picture.unwrap_or_default(),
        connected_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::header::COOKIE;
    use axum::http::{HeaderMap, HeaderValue};

    use crate::chat::broadcast::Broadcaster;
    use crate::chat::registry::RoomRegistry;
    use crate::config::Config;
    use crate::directory::{MemorySessionDirectory, MemoryUserDirectory, UserProfile};

    use super::*;

    const SECRET: &str = "test-secret";

    fn test_state() -> (AppState, Arc<MemorySessionDirectory>, Arc<MemoryUserDirectory>) {
        let sessions = Arc::new(MemorySessionDirectory::new());
        let users = Arc::new(MemoryUserDirectory::new());
        let rooms = Arc::new(RoomRegistry::new());
        let state = AppState {
            sessions: sessions.clone(),
            users: users.clone(),
            rooms: rooms.clone(),
            broadcast: Broadcaster::new(rooms),
            config: Arc::new(Config {
                session_secret: SECRET.to_string(),
                session_cookie: "connect.sid".to_string(),
                chat_room: "main_chat".to_string(),
                port: 0,
            }),
        };
        (state, sessions, users)
    }

    fn cookie_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[tokio::test]
    async fn resolves_identity_for_valid_session() {
        let (state, sessions, users) = test_state();
        sessions.insert("sess1", "usr_1");
        users.insert(
            "usr_1",
            UserProfile {
                nick: Some("alice".to_string()),
                name: Some("Alice Example".to_string()),
                location: None,
                picture: None,
            },
        );

        let value = format!("connect.sid={}", cookie::sign("sess1", SECRET));
        let identity = authenticate(&state, &cookie_headers(&value)).await.unwrap();

        assert_eq!(identity.user_id, "usr_1");
        assert_eq!(identity.nick, "alice");
        assert_eq!(identity.name, "Alice Example");
        // Absent optional fields default to empty.
        assert_eq!(identity.location, "");
        assert_eq!(identity.picture, "");
    }

    #[tokio::test]
    async fn rejects_missing_cookie_header() {
        let (state, _, _) = test_state();
        let err = authenticate(&state, &HeaderMap::new()).await.unwrap_err();
        assert_eq!(err, AuthFailure::InvalidSignature);
    }

    #[tokio::test]
    async fn rejects_tampered_signature() {
        let (state, sessions, users) = test_state();
        sessions.insert("sess1", "usr_1");
        users.insert("usr_1", UserProfile::default());

        let value = format!("connect.sid={}", cookie::sign("sess1", "wrong-secret"));
        let err = authenticate(&state, &cookie_headers(&value))
            .await
            .unwrap_err();
        assert_eq!(err, AuthFailure::InvalidSignature);
    }

    #[tokio::test]
    async fn rejects_unknown_session() {
        let (state, _, _) = test_state();
        let value = format!("connect.sid={}", cookie::sign("sess-unknown", SECRET));
        let err = authenticate(&state, &cookie_headers(&value))
            .await
            .unwrap_err();
        assert_eq!(err, AuthFailure::SessionNotFound);
    }

    #[tokio::test]
    async fn rejects_session_for_deleted_user() {
        let (state, sessions, _) = test_state();
        sessions.insert("sess1", "usr_gone");

        let value = format!("connect.sid={}", cookie::sign("sess1", SECRET));
        let err = authenticate(&state, &cookie_headers(&value))
            .await
            .unwrap_err();
        assert_eq!(err, AuthFailure::UserNotFound);
    }
}
