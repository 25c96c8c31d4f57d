//! Top-level analysis entry point: validation, cache, ensemble.

use std::collections::BTreeMap;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

use crate::backend::{HealthStats, QuotaUsage};
use crate::cache::{CacheManager, CacheStats};
use crate::config::Config;
use crate::ensemble::{EnsemblePredictor, Prediction, SystemHealth};
use crate::metrics;
use crate::validate::{validate_text, TextValidationError};

/// The only caller-visible failures: everything else degrades to a verdict.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    InvalidText(#[from] TextValidationError),
}

/// Caller-facing service: `analyze(text)` plus the health/quota/cache
/// reporting consumed by dashboards.
pub struct Analyzer {
    predictor: EnsemblePredictor,
    cache: CacheManager,
    min_text_length: usize,
    max_text_length: usize,
}

impl Analyzer {
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            EnsemblePredictor::from_config(config),
            CacheManager::new(&config.cache.path, config.cache.ttl_hours),
            config,
        )
    }

    pub fn new(predictor: EnsemblePredictor, cache: CacheManager, config: &Config) -> Self {
        Self {
            predictor,
            cache,
            min_text_length: config.analysis.min_text_length,
            max_text_length: config.analysis.max_text_length,
        }
    }

    /// Analyze one text. Synchronous from the caller's perspective even
    /// though backends fan out internally; fails only on invalid input.
    pub async fn analyze(&self, text: &str) -> Result<Prediction, AnalyzeError> {
        if let Err(err) = validate_text(text, self.min_text_length, self.max_text_length) {
            metrics::VALIDATION_FAILURES.inc();
            return Err(err.into());
        }

        if let Some(hit) = self.cache.get(text) {
            debug!("returning cached prediction");
            metrics::CACHE_HITS.inc();
            metrics::ANALYSES_TOTAL
                .with_label_values(&[&hit.prediction.to_string(), "true"])
                .inc();
            return Ok(hit);
        }
        metrics::CACHE_MISSES.inc();

        let start = Instant::now();
        let prediction = self.predictor.predict(text).await;
        self.cache.set(text, &prediction);

        metrics::ANALYSIS_DURATION
            .with_label_values(&[])
            .observe(start.elapsed().as_secs_f64());
        metrics::ANALYSES_TOTAL
            .with_label_values(&[&prediction.prediction.to_string(), "false"])
            .inc();

        Ok(prediction)
    }

    pub fn system_health(&self) -> SystemHealth {
        self.predictor.system_health()
    }

    pub fn quota_usage(&self) -> BTreeMap<String, QuotaUsage> {
        self.predictor.quota_usage()
    }

    pub fn health_stats(&self) -> BTreeMap<String, HealthStats> {
        self.predictor.health_stats()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear()
    }
}
