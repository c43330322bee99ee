use std::{net::SocketAddr, time::Duration};

/// Settings for the YouTube transcript provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Pause before each YouTube request to stay under rate limits
    pub delay_ms: u64,
    pub timeout: Duration,
    pub accept_language: String,
    /// Keep basic HTML formatting tags (`<b>`, `<i>`, ...) in caption text
    pub preserve_formatting: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            delay_ms: 500,
            timeout: Duration::from_secs(30),
            accept_language: "en-US".to_string(),
            preserve_formatting: false,
        }
    }
}

/// Settings for the HTTP listener
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Path the transcript endpoint is mounted on
    pub route: String,
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3000)),
            route: "/api/transcript".to_string(),
            body_limit: 1 << 20,
        }
    }
}
