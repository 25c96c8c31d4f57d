use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use veriscan_core::{load_config, load_default_config, validate_config, Analyzer};
use veriscan_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

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

    info!("veriscan {} starting", VERSION);

    // Determine config path
    let config_path = std::env::var("VERISCAN_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration; without a file the service runs on defaults plus
    // VERISCAN_* environment overrides (heuristic-only when no keys are set)
    let mut config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!("No config file at {:?}, using defaults and environment", config_path);
        load_default_config().context("Failed to load configuration from environment")?
    };

    // Validate configuration
    validate_config(&mut config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");

    // Create metrics registry
    let registry = prometheus::Registry::new();
    for metric in veriscan_core::metrics::all_metrics() {
        registry
            .register(metric)
            .context("Failed to register metrics")?;
    }

    // Create the analyzer (backends, cache, heuristic engine)
    let analyzer = Arc::new(Analyzer::from_config(&config));
    info!(
        active_models = ?analyzer.system_health().active_models,
        "Analyzer initialized"
    );

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, analyzer, registry));
    let router = create_router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to install shutdown handler: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
