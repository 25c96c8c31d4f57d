//! Ensemble predictor - concurrent fan-out over the configured backends.

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::backend::types::round4;
use crate::backend::{
    Availability, BackendResult, BackendStatus, GeminiBackend, GroqBackend, HealthStats,
    HuggingFaceBackend, QuotaUsage, TextBackend,
};
use crate::config::{Config, EnsembleConfig};
use crate::ensemble::aggregator::Aggregator;
use crate::ensemble::fallback::FallbackChain;
use crate::ensemble::types::{Prediction, SystemHealth, SystemStatus};
use crate::heuristic::HeuristicAnalyzer;
use crate::metrics;

/// Fans out one analysis request to the heuristic engine, the sentiment
/// backend and the fallback-chain-selected LLM backend, then reconciles
/// whichever subset responded.
///
/// The heuristic runs inline (it is cheap and does no I/O); the remote
/// branches run concurrently, each under its own deadline. A failing or
/// timed-out branch is simply absent from aggregation; it never fails the
/// request and never cancels its sibling.
pub struct EnsemblePredictor {
    heuristic: HeuristicAnalyzer,
    sentiment: Option<Arc<dyn TextBackend>>,
    primary_llm: Option<Arc<dyn TextBackend>>,
    secondary_llm: Option<Arc<dyn TextBackend>>,
    aggregator: Aggregator,
    ensemble_config: EnsembleConfig,
    model_timeout: Duration,
}

impl EnsemblePredictor {
    /// Predictor with no remote backends; analysis is heuristic-only until
    /// backends are attached via the `with_*` builders.
    pub fn new(config: EnsembleConfig) -> Self {
        Self {
            heuristic: HeuristicAnalyzer::new(),
            sentiment: None,
            primary_llm: None,
            secondary_llm: None,
            aggregator: Aggregator::new(&config),
            model_timeout: Duration::from_secs(config.model_timeout_secs),
            ensemble_config: config,
        }
    }

    /// Build the predictor with the real provider adapters.
    pub fn from_config(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.ensemble.model_timeout_secs);
        let backends = &config.backends;

        let mut huggingface = HuggingFaceBackend::new(
            backends.huggingface.api_key.clone(),
            backends.huggingface.daily_quota,
            timeout,
        );
        if let Some(base) = &backends.huggingface.api_base {
            huggingface = huggingface.with_api_base(base.clone());
        }

        let mut gemini = GeminiBackend::new(
            backends.gemini.api_key.clone(),
            backends.gemini.daily_quota,
            timeout,
        );
        if let Some(base) = &backends.gemini.api_base {
            gemini = gemini.with_api_base(base.clone());
        }

        let mut groq = GroqBackend::new(
            backends.groq.api_key.clone(),
            backends.groq.daily_quota,
            timeout,
        );
        if let Some(base) = &backends.groq.api_base {
            groq = groq.with_api_base(base.clone());
        }

        let predictor = Self::new(config.ensemble.clone())
            .with_sentiment(Arc::new(huggingface))
            .with_primary_llm(Arc::new(gemini))
            .with_secondary_llm(Arc::new(groq));

        info!(
            active_models = ?predictor.active_models(),
            "ensemble predictor initialized"
        );
        predictor
    }

    pub fn with_sentiment(mut self, backend: Arc<dyn TextBackend>) -> Self {
        self.sentiment = Some(backend);
        self
    }

    pub fn with_primary_llm(mut self, backend: Arc<dyn TextBackend>) -> Self {
        self.primary_llm = Some(backend);
        self
    }

    pub fn with_secondary_llm(mut self, backend: Arc<dyn TextBackend>) -> Self {
        self.secondary_llm = Some(backend);
        self
    }

    /// Run the full ensemble and aggregate into a verdict. Never fails:
    /// degraded service produces a verdict from whatever responded.
    pub async fn predict(&self, text: &str) -> Prediction {
        let start = Instant::now();

        let results = self.run_backends(text).await;
        let mut prediction = self.aggregator.aggregate(&results);
        prediction.processing_time = round4(start.elapsed().as_secs_f64());
        prediction.timestamp = Utc::now();

        info!(
            verdict = %prediction.prediction,
            fake_probability = prediction.fake_probability,
            confidence = prediction.confidence,
            models = ?prediction.models_used,
            "ensemble prediction"
        );

        prediction
    }

    async fn run_backends(&self, text: &str) -> Vec<BackendResult> {
        let mut results = Vec::with_capacity(3);

        // The heuristic is synchronous and has no failure path.
        results.push(self.heuristic.analyze(text));

        let chain = FallbackChain::new(self.primary_llm.clone(), self.secondary_llm.clone());
        let (sentiment_result, llm_result) = tokio::join!(
            self.run_sentiment(text),
            chain.predict(text, self.model_timeout),
        );

        results.extend(sentiment_result);
        results.extend(llm_result);
        results
    }

    /// The sentiment backend is independent of the LLM chain and always
    /// attempted in parallel when available.
    async fn run_sentiment(&self, text: &str) -> Option<BackendResult> {
        let backend = self.sentiment.as_ref()?;
        match backend.availability() {
            Availability::Available => {}
            reason => {
                debug!(backend = backend.name(), ?reason, "skipping sentiment backend");
                return None;
            }
        }

        match tokio::time::timeout(self.model_timeout, backend.predict(text)).await {
            Ok(Ok(result)) => {
                metrics::BACKEND_REQUESTS
                    .with_label_values(&[backend.name(), "success"])
                    .inc();
                metrics::BACKEND_LATENCY
                    .with_label_values(&[backend.name()])
                    .observe(result.processing_time);
                Some(result)
            }
            Ok(Err(err)) => {
                warn!(backend = backend.name(), error = %err, "sentiment backend failed");
                metrics::BACKEND_REQUESTS
                    .with_label_values(&[backend.name(), "error"])
                    .inc();
                None
            }
            Err(_) => {
                warn!(
                    backend = backend.name(),
                    timeout_secs = self.model_timeout.as_secs(),
                    "sentiment backend timed out"
                );
                metrics::BACKEND_REQUESTS
                    .with_label_values(&[backend.name(), "timeout"])
                    .inc();
                None
            }
        }
    }

    fn remote_backends(&self) -> impl Iterator<Item = &Arc<dyn TextBackend>> {
        self.sentiment
            .iter()
            .chain(self.primary_llm.iter())
            .chain(self.secondary_llm.iter())
    }

    /// The heuristic plus every remote backend with a configured credential.
    pub fn active_models(&self) -> Vec<String> {
        let mut models = vec!["heuristic".to_string()];
        for backend in self.remote_backends() {
            if backend.availability() != Availability::NotConfigured {
                models.push(backend.name().to_string());
            }
        }
        models
    }

    /// Overall status is healthy while any remote backend is; heuristic-only
    /// operation is degraded but still serving.
    pub fn system_health(&self) -> SystemHealth {
        let mut backends = BTreeMap::new();
        for backend in self.remote_backends() {
            backends.insert(backend.name().to_string(), backend.health_stats());
        }

        let any_remote_healthy = backends
            .values()
            .any(|stats| stats.status == BackendStatus::Healthy);

        SystemHealth {
            overall_status: if any_remote_healthy {
                SystemStatus::Healthy
            } else {
                SystemStatus::Degraded
            },
            active_models: self.active_models(),
            heuristic: BackendStatus::Healthy,
            backends,
            weights: self.ensemble_config.weights,
        }
    }

    /// Per-backend quota counters for dashboards.
    pub fn quota_usage(&self) -> BTreeMap<String, QuotaUsage> {
        self.remote_backends()
            .map(|backend| (backend.name().to_string(), backend.quota_usage()))
            .collect()
    }

    /// Per-backend health stats for dashboards.
    pub fn health_stats(&self) -> BTreeMap<String, HealthStats> {
        self.remote_backends()
            .map(|backend| (backend.name().to_string(), backend.health_stats()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::ensemble::types::Verdict;
    use crate::testing::{fixtures, MockBackend};

    fn predictor_with(
        sentiment: Option<Arc<MockBackend>>,
        primary: Option<Arc<MockBackend>>,
        secondary: Option<Arc<MockBackend>>,
    ) -> EnsemblePredictor {
        let mut predictor = EnsemblePredictor::new(EnsembleConfig::default());
        if let Some(backend) = sentiment {
            predictor = predictor.with_sentiment(backend);
        }
        if let Some(backend) = primary {
            predictor = predictor.with_primary_llm(backend);
        }
        if let Some(backend) = secondary {
            predictor = predictor.with_secondary_llm(backend);
        }
        predictor
    }

    const NEUTRAL_TEXT: &str =
        "The committee published its annual report on infrastructure spending today.";

    #[tokio::test]
    async fn test_heuristic_only_prediction() {
        let predictor = EnsemblePredictor::new(EnsembleConfig::default());
        let prediction = predictor.predict(NEUTRAL_TEXT).await;

        assert_eq!(prediction.models_used, vec!["heuristic".to_string()]);
        assert!(!prediction.cached);
        assert!((0.0..=1.0).contains(&prediction.fake_probability));
    }

    #[tokio::test]
    async fn test_all_configured_backends_contribute() {
        let sentiment = Arc::new(MockBackend::new("huggingface"));
        sentiment.push_result(fixtures::backend_result("huggingface", 0.8, 0.9));
        let primary = Arc::new(MockBackend::new("gemini"));
        primary.push_result(fixtures::backend_result("gemini", 0.9, 0.95));

        let predictor = predictor_with(Some(sentiment), Some(primary), None);
        let prediction = predictor.predict(NEUTRAL_TEXT).await;

        assert_eq!(prediction.models_used.len(), 3);
        assert!(prediction.models_used.contains(&"heuristic".to_string()));
        assert!(prediction.models_used.contains(&"huggingface".to_string()));
        assert!(prediction.models_used.contains(&"gemini".to_string()));
    }

    #[tokio::test]
    async fn test_failing_sentiment_does_not_block_analysis() {
        let sentiment = Arc::new(MockBackend::new("huggingface"));
        sentiment.push_error(BackendError::Http("connection refused".to_string()));
        let primary = Arc::new(MockBackend::new("gemini"));
        primary.push_result(fixtures::backend_result("gemini", 0.2, 0.9));

        let predictor = predictor_with(Some(sentiment), Some(primary), None);
        let prediction = predictor.predict(NEUTRAL_TEXT).await;

        assert!(!prediction.models_used.contains(&"huggingface".to_string()));
        assert!(prediction.models_used.contains(&"gemini".to_string()));
    }

    #[tokio::test]
    async fn test_llm_fallback_used_when_primary_quota_exhausted() {
        let primary = Arc::new(MockBackend::new("gemini"));
        primary.set_availability(Availability::QuotaExhausted { used: 10, limit: 10 });
        let secondary = Arc::new(MockBackend::new("groq"));
        secondary.push_result(fixtures::backend_result("groq", 0.85, 0.9));

        let predictor = predictor_with(None, Some(primary), Some(secondary));
        let prediction = predictor.predict(NEUTRAL_TEXT).await;

        assert!(prediction.models_used.contains(&"groq".to_string()));
    }

    #[tokio::test]
    async fn test_indicators_survive_aggregation() {
        let predictor = EnsemblePredictor::new(EnsembleConfig::default());
        let prediction = predictor
            .predict("SHOCKING!!! You won't believe what doctors hate!!! EXPOSED!!!")
            .await;

        assert!(prediction.indicators["clickbait_patterns"] >= 0.4);
        assert!(!prediction.indicator_details.is_empty());
    }

    #[tokio::test]
    async fn test_strong_signals_yield_fake_verdict() {
        let sentiment = Arc::new(MockBackend::new("huggingface"));
        sentiment.push_result(fixtures::backend_result("huggingface", 0.95, 0.9));
        let primary = Arc::new(MockBackend::new("gemini"));
        primary.push_result(fixtures::backend_result("gemini", 0.95, 0.95));

        let predictor = predictor_with(Some(sentiment), Some(primary), None);
        let prediction = predictor
            .predict("SHOCKING!!! You won't believe what doctors hate!!! EXPOSED!!!")
            .await;

        assert_eq!(prediction.prediction, Verdict::Fake);
    }

    #[test]
    fn test_active_models_excludes_unconfigured() {
        let sentiment = Arc::new(MockBackend::new("huggingface"));
        sentiment.set_availability(Availability::NotConfigured);
        let primary = Arc::new(MockBackend::new("gemini"));

        let predictor = predictor_with(Some(sentiment), Some(primary), None);
        let models = predictor.active_models();

        assert_eq!(models, vec!["heuristic".to_string(), "gemini".to_string()]);
    }

    #[test]
    fn test_system_health_degraded_without_remotes() {
        let predictor = EnsemblePredictor::new(EnsembleConfig::default());
        let health = predictor.system_health();

        assert_eq!(health.overall_status, SystemStatus::Degraded);
        assert_eq!(health.heuristic, BackendStatus::Healthy);
        assert!(health.backends.is_empty());
    }

    #[test]
    fn test_system_health_healthy_with_one_remote() {
        let primary = Arc::new(MockBackend::new("gemini"));
        let predictor = predictor_with(None, Some(primary), None);
        let health = predictor.system_health();

        assert_eq!(health.overall_status, SystemStatus::Healthy);
        assert!(health.backends.contains_key("gemini"));
    }

    #[test]
    fn test_quota_usage_per_backend() {
        let sentiment = Arc::new(MockBackend::new("huggingface"));
        let primary = Arc::new(MockBackend::new("gemini"));
        let predictor = predictor_with(Some(sentiment), Some(primary), None);

        let usage = predictor.quota_usage();
        assert_eq!(usage.len(), 2);
        assert!(usage.contains_key("huggingface"));
        assert!(usage.contains_key("gemini"));
    }
}
