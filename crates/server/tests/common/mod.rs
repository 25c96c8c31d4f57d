//! Shared helpers for server integration tests.

use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;

use veriscan_server::api::create_router;
use veriscan_server::state::AppState;
use veriscan_core::{Analyzer, Config};

/// Router over a default (heuristic-only) configuration with the cache kept
/// in a temp dir. The TempDir must outlive the router.
pub fn test_router() -> (Router, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = Config::default();
    config.cache.path = dir.path().join("cache.json");

    let registry = prometheus::Registry::new();
    for metric in veriscan_core::metrics::all_metrics() {
        registry.register(metric).expect("Failed to register metrics");
    }

    let analyzer = Arc::new(Analyzer::from_config(&config));
    let state = Arc::new(AppState::new(config, analyzer, registry));

    (create_router(state), dir)
}
