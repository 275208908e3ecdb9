use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_api::chat::broadcast::Broadcaster;
use chat_api::chat::registry::RoomRegistry;
use chat_api::config::Config;
use chat_api::directory::{
    MemorySessionDirectory, MemoryUserDirectory, SessionDirectory, UserDirectory,
};
use chat_api::AppState;

#[tokio::main]
async fn main() {
    // Load .env file (silently skip if missing — env vars may be set externally)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let port = config.port;

    // In-memory directories until the shared session/user stores are wired
    // in. The HTTP layer seeds sessions through these same handles.
    let sessions: Arc<dyn SessionDirectory> = Arc::new(MemorySessionDirectory::new());
    let users: Arc<dyn UserDirectory> = Arc::new(MemoryUserDirectory::new());

    let rooms = Arc::new(RoomRegistry::new());
    let broadcast = Broadcaster::new(rooms.clone());

    tracing::info!(
        room = %config.chat_room,
        cookie = %config.session_cookie,
        "chat-api configured"
    );

    let state = AppState {
        sessions,
        users,
        rooms,
        broadcast,
        config: Arc::new(config),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(chat_api::routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "chat-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
