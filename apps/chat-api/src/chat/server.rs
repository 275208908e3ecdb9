//! Socket upgrade handler and per-connection event loop.
//!
//! A connection moves through connecting → authenticated → joined →
//! closed. Authentication happens during the HTTP upgrade, so a rejected
//! handshake never opens a socket; an admitted connection joins the
//! configured room before its event loop starts, and teardown removes the
//! membership exactly once.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::auth::handshake::{self, Identity};
use crate::AppState;

use super::connection::ChatConnection;
use super::events::ClientEvent;

pub fn router() -> Router<AppState> {
    Router::new().route("/chat/socket", get(ws_upgrade))
}

/// Authenticate the handshake before promoting the transport. A rejected
/// handshake answers the plain HTTP request with 401 and never upgrades.
async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    match handshake::authenticate(&state, &headers).await {
        Ok(identity) => ws
            .on_upgrade(move |socket| handle_connection(socket, state, identity))
            .into_response(),
        Err(failure) => {
            tracing::info!(%failure, "socket handshake rejected");
            failure.into_response()
        }
    }
}

async fn handle_connection(socket: WebSocket, state: AppState, identity: Identity) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let conn = ChatConnection::new(identity, tx);
    let room = state.config.chat_room.clone();

    tracing::info!(
        conn_id = %conn.conn_id,
        user_id = %conn.identity.user_id,
        nick = %conn.identity.nick,
        "chat connection established"
    );

    // Membership is recorded before the join broadcasts so the joiner's own
    // status update already includes it.
    state.rooms.join(&room, &conn);
    state.broadcast.announce_join(&room, &conn);

    loop {
        tokio::select! {
            // Client sends us a frame.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let event: ClientEvent = match serde_json::from_str(&text) {
                            Ok(event) => event,
                            Err(e) => {
                                tracing::debug!(
                                    conn_id = %conn.conn_id,
                                    error = %e,
                                    "ignoring unparseable client frame"
                                );
                                continue;
                            }
                        };

                        match event {
                            ClientEvent::Send { message } => {
                                state.broadcast.relay_message(&room, &conn.identity, &message);
                            }
                            ClientEvent::GetStatus {} => {
                                state.broadcast.announce_status(&room);
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(conn_id = %conn.conn_id, ?e, "socket read error");
                        break;
                    }
                    _ => continue,
                }
            }

            // Event from the broadcast engine.
            event = rx.recv() => {
                match event {
                    Some(event) => {
                        let json = serde_json::to_string(&event).unwrap();
                        if ws_tx.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    // Membership must be gone before the departure is announced, and a
    // double close finds no member to remove, so nothing double-broadcasts.
    if let Some(identity) = state.rooms.leave(&room, &conn.conn_id) {
        state.broadcast.announce_leave(&room, &identity);
    }

    tracing::info!(
        conn_id = %conn.conn_id,
        user_id = %conn.identity.user_id,
        "chat connection closed"
    );
}
