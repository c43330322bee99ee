use std::{net::SocketAddr, time::Duration};

use clap::Parser;
use ytt_server::{ProviderConfig, ServerConfig};

/// Serve YouTube transcripts over HTTP
#[derive(Debug, Parser)]
#[command(name = "ytt-server", version, about = "HTTP endpoint serving YouTube transcripts")]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3000", env = "YTT_LISTEN")]
    pub listen: SocketAddr,

    /// Path of the transcript endpoint
    #[arg(long, default_value = "/api/transcript", env = "YTT_ROUTE")]
    pub route: String,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = 1 << 20, env = "YTT_BODY_LIMIT")]
    pub body_limit: usize,

    /// Delay in milliseconds before each request to YouTube
    #[arg(long, default_value_t = 500, env = "YTT_DELAY_MS")]
    pub delay_ms: u64,

    /// Timeout in seconds for requests to YouTube
    #[arg(long, default_value_t = 30, env = "YTT_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Accept-Language header sent to YouTube
    #[arg(long, default_value = "en-US", env = "YTT_ACCEPT_LANGUAGE")]
    pub accept_language: String,

    /// Keep basic HTML formatting tags in caption text
    #[arg(long, env = "YTT_PRESERVE_FORMATTING")]
    pub preserve_formatting: bool,

    /// Log filter directive (e.g. "info" or "ytt_server=debug")
    #[arg(long, default_value = "info", env = "YTT_LOG")]
    pub log_filter: String,
}

impl Args {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            listen: self.listen,
            route: self.route.clone(),
            body_limit: self.body_limit,
        }
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            delay_ms: self.delay_ms,
            timeout: Duration::from_secs(self.timeout_secs),
            accept_language: self.accept_language.clone(),
            preserve_formatting: self.preserve_formatting,
        }
    }
}
