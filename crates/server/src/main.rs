mod api;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinesub_core::{
    load_config, validate_config, BaiscopeSearcher, HttpAssetFetcher, SqliteCatalog,
    SubtitleLibrary, SubtitleOrchestrator, TmdbClient, TracingNotifier,
};

use api::create_router;
use state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("CINESUB_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Subtitle site: {}", config.site.url);
    info!("Database path: {:?}", config.database.path);
    info!("Library root: {:?}", config.library.root);

    // Create media catalog
    let catalog = Arc::new(
        SqliteCatalog::new(&config.database.path).context("Failed to create media catalog")?,
    );
    info!("Media catalog initialized");

    // Create metadata client
    let metadata = Arc::new(
        TmdbClient::new(config.tmdb.clone()).context("Failed to create TMDB client")?,
    );
    info!("TMDB client initialized");

    // Create site searcher and asset fetcher
    let searcher = Arc::new(BaiscopeSearcher::new(config.site.clone()));
    let fetcher = Arc::new(HttpAssetFetcher::new(&config.site));
    info!("Site searcher and asset fetcher initialized");

    // Create orchestrator over the on-disk library
    let library = SubtitleLibrary::new(config.library.root.clone());
    let orchestrator = Arc::new(SubtitleOrchestrator::new(
        catalog,
        metadata,
        searcher,
        fetcher,
        library,
        Arc::new(TracingNotifier),
    ));
    info!("Acquisition orchestrator initialized");

    // Create app state and router
    let state = Arc::new(AppState::new(config.clone(), orchestrator));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
