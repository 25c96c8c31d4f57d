//! HuggingFace Inference API sentiment-classification backend.
//!
//! Fake probability is derived from the class scores of a sentiment model:
//! strongly negative text correlates with misinformation framing, so the
//! negative class dominates the weighting.

use async_trait::async_trait;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

use super::health::HealthTracker;
use super::llm::truncate_chars;
use super::quota::QuotaTracker;
use super::retry::with_retry;
use super::types::{clamp_unit, round4, BackendAux, BackendResult, HealthStats, QuotaUsage};
use super::{Availability, BackendError, TextBackend};

pub const BACKEND_NAME: &str = "huggingface";

const MODEL_ID: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";
const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co";

/// Maximum input characters accepted by the classification model.
const MAX_INPUT_CHARS: usize = 512;

/// Class weights combined into a fake probability.
const WEIGHT_NEGATIVE: f64 = 0.85;
const WEIGHT_POSITIVE: f64 = 0.4;
const WEIGHT_NEUTRAL: f64 = 0.15;

pub struct HuggingFaceBackend {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    timeout: Duration,
    quota: QuotaTracker,
    health: HealthTracker,
}

impl HuggingFaceBackend {
    pub fn new(api_key: impl Into<String>, daily_quota: u32, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout,
            quota: QuotaTracker::new(daily_quota),
            health: HealthTracker::new(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    async fn request(&self, text: &str) -> Result<Value, BackendError> {
        let url = format!("{}/models/{}", self.api_base, MODEL_ID);

        debug!(chars = text.len(), "huggingface classification request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "inputs": text }))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(self.timeout)
                } else {
                    BackendError::Http(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(BackendError::QuotaExceeded("rate limit exceeded".to_string()));
        }
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api { status, message });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))
    }

    /// Normalize the classification payload into probability, confidence and
    /// the winning sentiment label. Malformed payloads yield the neutral
    /// default.
    fn parse_response(response: &Value) -> (f64, f64, String) {
        // The inference API wraps single-input results in a nested array.
        let classes = match response {
            Value::Array(outer) => match outer.first() {
                Some(Value::Array(inner)) => inner.as_slice(),
                _ => outer.as_slice(),
            },
            _ => return (0.5, 0.5, "unknown".to_string()),
        };

        let mut negative = 0.0;
        let mut neutral = 0.0;
        let mut positive = 0.0;
        for class in classes {
            let label = class
                .get("label")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase();
            let score = class.get("score").and_then(Value::as_f64).unwrap_or(0.0);
            match label.as_str() {
                "negative" => negative = score,
                "neutral" => neutral = score,
                "positive" => positive = score,
                _ => {}
            }
        }

        if negative == 0.0 && neutral == 0.0 && positive == 0.0 {
            return (0.5, 0.5, "unknown".to_string());
        }

        let fake_probability = clamp_unit(
            negative * WEIGHT_NEGATIVE + positive * WEIGHT_POSITIVE + neutral * WEIGHT_NEUTRAL,
        );
        let confidence = negative.max(neutral).max(positive);

        let sentiment = if negative >= neutral && negative >= positive {
            "negative"
        } else if neutral >= negative && neutral >= positive {
            "neutral"
        } else {
            "positive"
        };

        (round4(fake_probability), round4(confidence), sentiment.to_string())
    }

    async fn run_predict(&self, text: &str) -> Result<BackendResult, BackendError> {
        if self.api_key.is_empty() {
            return Err(BackendError::NotConfigured);
        }
        self.quota.check()?;

        let start = Instant::now();
        let input = truncate_chars(text, MAX_INPUT_CHARS);
        let response = with_retry(BACKEND_NAME, || self.request(input)).await?;
        self.quota.record_use();

        let (fake_probability, confidence, sentiment) = Self::parse_response(&response);
        let elapsed = start.elapsed().as_secs_f64();
        self.health.record_success(elapsed);

        Ok(BackendResult {
            backend: BACKEND_NAME.to_string(),
            fake_probability,
            confidence,
            processing_time: round4(elapsed),
            aux: BackendAux::Sentiment {
                sentiment,
                raw_response: response,
            },
        })
    }
}

#[async_trait]
impl TextBackend for HuggingFaceBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn availability(&self) -> Availability {
        if self.api_key.is_empty() {
            return Availability::NotConfigured;
        }
        if self.quota.is_exhausted() {
            let (used, limit) = self.quota.counters();
            return Availability::QuotaExhausted { used, limit };
        }
        Availability::Available
    }

    fn quota_usage(&self) -> QuotaUsage {
        self.quota.usage()
    }

    fn health_stats(&self) -> HealthStats {
        self.health.stats(self.is_available(), self.quota.usage())
    }

    async fn predict(&self, text: &str) -> Result<BackendResult, BackendError> {
        match self.run_predict(text).await {
            Ok(result) => Ok(result),
            Err(err) => {
                self.health.record_error();
                Err(err)
            }
        }
    }
}
