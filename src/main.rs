mod args;

use std::sync::Arc;

use anyhow::Context;
use args::Args;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use ytt_server::{router, YouTubeProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let server_config = args.server_config();
    let provider = YouTubeProvider::new(&args.provider_config())
        .context("Failed to initialize YouTube transcript provider")?;

    let app = router(Arc::new(provider), &server_config);

    let listener = tokio::net::TcpListener::bind(server_config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", server_config.listen))?;

    tracing::info!(
        listen = %server_config.listen,
        route = %server_config.route,
        "starting ytt-server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("ytt-server stopped");
    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
