use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Analysis
        .route("/analyze", post(handlers::analyze))
        // Health and quota for dashboards
        .route("/health", get(handlers::health))
        .route("/quota", get(handlers::quota))
        // Result cache
        .route("/cache/stats", get(handlers::cache_stats))
        .route("/cache", delete(handlers::clear_cache))
        // Config (secrets redacted)
        .route("/config", get(handlers::get_config));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::export_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
