/// Chat API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret shared with the HTTP layer; session-cookie signatures are
    /// verified against it.
    pub session_secret: String,
    /// Name of the signed session-id cookie the HTTP layer sets.
    pub session_cookie: String,
    /// The room every authenticated connection joins.
    pub chat_room: String,
    /// Port the HTTP server binds to.
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Panics with a descriptive message if a required variable is missing.
    pub fn from_env() -> Self {
        Self {
            session_secret: required_var("SESSION_SECRET"),
            session_cookie: var_or("SESSION_COOKIE", "connect.sid"),
            chat_room: var_or("CHAT_ROOM", "main_chat"),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }
}

fn required_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} env var is required"))
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}
