use axum::{extract::State, http::StatusCode, Json};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::error;

use veriscan_core::{
    CacheStats, Prediction, QuotaUsage, SanitizedConfig, SystemHealth,
};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// POST /api/v1/analyze
///
/// The only hard failure is invalid input; degraded backends still produce
/// a verdict.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Prediction>, (StatusCode, Json<ErrorResponse>)> {
    match state.analyzer().analyze(&request.text).await {
        Ok(prediction) => Ok(Json(prediction)),
        Err(err) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )),
    }
}

/// GET /api/v1/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<SystemHealth> {
    Json(state.analyzer().system_health())
}

/// GET /api/v1/quota
pub async fn quota(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, QuotaUsage>> {
    Json(state.analyzer().quota_usage())
}

/// GET /api/v1/cache/stats
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.analyzer().cache_stats())
}

/// DELETE /api/v1/cache
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    state.analyzer().clear_cache();
    StatusCode::NO_CONTENT
}

/// GET /api/v1/config
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// GET /metrics - Prometheus text exposition
pub async fn export_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<String, (StatusCode, String)> {
    let metric_families = state.registry().gather();
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", err);
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to encode metrics".to_string(),
        ));
    }

    String::from_utf8(buffer).map_err(|err| {
        error!("Metrics buffer not valid UTF-8: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to encode metrics".to_string(),
        )
    })
}
