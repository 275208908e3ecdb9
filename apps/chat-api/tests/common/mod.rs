use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use chat_api::auth::cookie;
use chat_api::chat::broadcast::Broadcaster;
use chat_api::chat::registry::RoomRegistry;
use chat_api::config::Config;
use chat_api::directory::{MemorySessionDirectory, MemoryUserDirectory, UserProfile};
use chat_api::AppState;

pub const TEST_SECRET: &str = "test-session-secret";

pub struct TestApp {
    pub addr: SocketAddr,
    pub state: AppState,
    pub sessions: Arc<MemorySessionDirectory>,
    pub users: Arc<MemoryUserDirectory>,
}

/// Start an actual TCP server for socket testing. The server runs in the
/// background; directories start empty and are seeded per test.
pub async fn spawn_server() -> TestApp {
    let sessions = Arc::new(MemorySessionDirectory::new());
    let users = Arc::new(MemoryUserDirectory::new());
    let rooms = Arc::new(RoomRegistry::new());
    let broadcast = Broadcaster::new(rooms.clone());

    let config = Config {
        session_secret: TEST_SECRET.to_string(),
        session_cookie: "connect.sid".to_string(),
        chat_room: "main_chat".to_string(),
        port: 0,
    };

    let state = AppState {
        sessions: sessions.clone(),
        users: users.clone(),
        rooms,
        broadcast,
        config: Arc::new(config),
    };

    let app = chat_api::routes::router().with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        addr,
        state,
        sessions,
        users,
    }
}

/// Seed a profile plus a session for it, returning the Cookie header value a
/// logged-in browser would send.
pub fn seed_user(app: &TestApp, user_id: &str, nick: &str) -> String {
    app.users.insert(
        user_id,
        UserProfile {
            nick: Some(nick.to_string()),
            name: Some(nick.to_string()),
            location: None,
            picture: None,
        },
    );
    let session_id = format!("sess-{user_id}");
    app.sessions.insert(&session_id, user_id);

    let signed = cookie::sign(&session_id, TEST_SECRET);
    format!("connect.sid={}", urlencoding::encode(&signed))
}

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Open a socket carrying the given Cookie header; panics on rejection.
pub async fn connect(addr: SocketAddr, cookie_header: &str) -> WsClient {
    try_connect(addr, cookie_header).await.expect("ws connect")
}

/// Open a socket carrying the given Cookie header.
pub async fn try_connect(
    addr: SocketAddr,
    cookie_header: &str,
) -> Result<WsClient, tokio_tungstenite::tungstenite::Error> {
    let mut request = format!("ws://{addr}/chat/socket").into_client_request()?;
    request
        .headers_mut()
        .insert(COOKIE, HeaderValue::from_str(cookie_header).unwrap());
    let (ws, _) = tokio_tungstenite::connect_async(request).await?;
    Ok(ws)
}

/// Read the next text frame as JSON, with a timeout.
pub async fn next_event(ws: &mut WsClient) -> serde_json::Value {
    loop {
        let msg = time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timeout waiting for event")
            .expect("stream ended")
            .expect("ws read error");
        if let tokio_tungstenite::tungstenite::Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("parse event");
        }
    }
}

/// Send one JSON value as a text frame.
pub async fn send_json(ws: &mut WsClient, value: serde_json::Value) {
    ws.send(tokio_tungstenite::tungstenite::Message::Text(
        value.to_string().into(),
    ))
    .await
    .expect("send frame");
}
