//! Fonts API - font catalog and preview server
//!
//! Serves font metadata, previews and licenses from remote catalogs.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fonts_api::api::{create_router, AppState};
use fonts_api::fetch::HttpFetcher;
use fonts_api::{spawn_refresh_task, Config, FontService};

/// Main entry point for the fonts server.
///
/// # Startup Sequence
/// 1. Load `.env` and initialize tracing
/// 2. Load configuration from environment variables
/// 3. Build the font service and populate providers
/// 4. Start the background catalog refresh task
/// 5. Serve HTTP until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fonts_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fonts API server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, data_dir={}, metadata_ttl={}s, font_ttl={}s",
        config.server_port,
        config.data_dir.display(),
        config.metadata_ttl,
        config.font_ttl
    );
    if config.google_api_key.is_empty() {
        warn!("GOOGLE_API_KEY is not set; catalog requests will likely fail");
    }

    let fetcher = Arc::new(HttpFetcher::new(config.http_timeout())?);
    let service = Arc::new(FontService::with_default_providers(&config, fetcher));
    service.initialize().await;

    let refresh_handle = spawn_refresh_task(Arc::clone(&service), config.refresh_interval());
    info!("Background refresh task started");

    let app = create_router(AppState::new(service));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(refresh_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the refresh task.
async fn shutdown_signal(refresh_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    refresh_handle.abort();
    warn!("Refresh task aborted");
}
