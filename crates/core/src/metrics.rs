//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Analyses (verdict counts, duration)
//! - Result cache (hits, misses)
//! - Remote backends (request outcomes, latency)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Analysis Metrics
// =============================================================================

/// Completed analyses by verdict and cache origin.
pub static ANALYSES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("veriscan_analyses_total", "Total completed analyses"),
        &["verdict", "cached"], // verdict: "FAKE", "REAL", "UNCERTAIN"; cached: "true", "false"
    )
    .unwrap()
});

/// End-to-end analysis duration in seconds (cache misses only).
pub static ANALYSIS_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "veriscan_analysis_duration_seconds",
            "Duration of uncached analyses",
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &[],
    )
    .unwrap()
});

/// Analyses rejected by input validation.
pub static VALIDATION_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "veriscan_validation_failures_total",
        "Analysis requests rejected by input validation",
    )
    .unwrap()
});

// =============================================================================
// Cache Metrics
// =============================================================================

/// Cache hits total.
pub static CACHE_HITS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("veriscan_cache_hits_total", "Total result cache hits").unwrap()
});

/// Cache misses total.
pub static CACHE_MISSES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("veriscan_cache_misses_total", "Total result cache misses").unwrap()
});

// =============================================================================
// Backend Metrics
// =============================================================================

/// Backend requests by outcome.
pub static BACKEND_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("veriscan_backend_requests_total", "Total backend requests"),
        &["backend", "result"], // result: "success", "error", "timeout", "quota"
    )
    .unwrap()
});

/// Backend call latency in seconds, successes only.
pub static BACKEND_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "veriscan_backend_latency_seconds",
            "Latency of successful backend calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["backend"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(ANALYSES_TOTAL.clone()),
        Box::new(ANALYSIS_DURATION.clone()),
        Box::new(VALIDATION_FAILURES.clone()),
        Box::new(CACHE_HITS.clone()),
        Box::new(CACHE_MISSES.clone()),
        Box::new(BACKEND_REQUESTS.clone()),
        Box::new(BACKEND_LATENCY.clone()),
    ]
}
