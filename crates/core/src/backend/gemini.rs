//! Gemini LLM backend, primary provider in the fallback chain.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

use super::health::HealthTracker;
use super::llm::{parse_judgement, truncate_chars, LlmJudgement, MAX_LLM_INPUT_CHARS, SYSTEM_PROMPT};
use super::quota::QuotaTracker;
use super::retry::with_retry;
use super::types::{round4, BackendAux, BackendResult, HealthStats, QuotaUsage};
use super::{Availability, BackendError, TextBackend};

pub const BACKEND_NAME: &str = "gemini";

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
const MODEL_ID: &str = "gemini-2.0-flash";

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    timeout: Duration,
    quota: QuotaTracker,
    health: HealthTracker,
}

impl GeminiBackend {
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
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_base, MODEL_ID, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: format!("{}\n\nAnalyze this text:\n\n{}", SYSTEM_PROMPT, text),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                max_output_tokens: 500,
                response_mime_type: "application/json",
            },
        };

        debug!(chars = text.len(), "gemini generateContent request");

        let response = self
            .client
            .post(&url)
            .json(&request)
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
        match status {
            200 => {}
            429 => {
                return Err(BackendError::QuotaExceeded("rate limit exceeded".to_string()));
            }
            400 => {
                let message = response.text().await.unwrap_or_default();
                if message.to_lowercase().contains("quota") {
                    return Err(BackendError::QuotaExceeded("API quota exceeded".to_string()));
                }
                return Err(BackendError::Api { status, message });
            }
            _ => {
                let message = response.text().await.unwrap_or_default();
                return Err(BackendError::Api { status, message });
            }
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))
    }

    /// Extract the completion text and parse the judgement from it.
    fn parse_response(response: &Value) -> LlmJudgement {
        response
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(parse_judgement)
            .unwrap_or_default()
    }

    async fn run_predict(&self, text: &str) -> Result<BackendResult, BackendError> {
        if self.api_key.is_empty() {
            return Err(BackendError::NotConfigured);
        }
        self.quota.check()?;

        let start = Instant::now();
        let input = truncate_chars(text, MAX_LLM_INPUT_CHARS);
        let response = with_retry(BACKEND_NAME, || self.request(input)).await?;
        self.quota.record_use();

        let judgement = Self::parse_response(&response);
        let elapsed = start.elapsed().as_secs_f64();
        self.health.record_success(elapsed);

        Ok(BackendResult {
            backend: BACKEND_NAME.to_string(),
            fake_probability: judgement.fake_probability,
            confidence: judgement.confidence,
            processing_time: round4(elapsed),
            aux: BackendAux::Llm {
                reasoning: judgement.reasoning,
                red_flags: judgement.red_flags,
                raw_response: response,
            },
        })
    }
}

#[async_trait]
impl TextBackend for GeminiBackend {
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_response_happy_path() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "text": "{\"fake_probability\": 0.9, \"confidence\": 0.8, \"reasoning\": \"fabricated\", \"red_flags\": [\"no sources\"]}"
                    }]
                }
            }]
        });
        let judgement = GeminiBackend::parse_response(&response);

        assert_eq!(judgement.fake_probability, 0.9);
        assert_eq!(judgement.confidence, 0.8);
        assert_eq!(judgement.reasoning, "fabricated");
        assert_eq!(judgement.red_flags, vec!["no sources".to_string()]);
    }

    #[test]
    fn test_parse_response_no_candidates() {
        let judgement = GeminiBackend::parse_response(&json!({"candidates": []}));
        assert_eq!(judgement, LlmJudgement::default());
    }

    #[test]
    fn test_parse_response_empty_text() {
        let response = json!({
            "candidates": [{"content": {"parts": [{"text": "no json here"}]}}]
        });
        let judgement = GeminiBackend::parse_response(&response);
        assert_eq!(judgement.fake_probability, 0.5);
        assert_eq!(judgement.confidence, 0.5);
    }

    #[test]
    fn test_request_serialization() {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: "hello".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                max_output_tokens: 500,
                response_mime_type: "application/json",
            },
        };
        let json = serde_json::to_string(&request).unwrap();

        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"maxOutputTokens\":500"));
        assert!(json.contains("\"responseMimeType\":\"application/json\""));
    }

    #[test]
    fn test_quota_exhaustion_reported_before_dispatch() {
        let backend = GeminiBackend::new("key", 0, Duration::from_secs(5));
        assert!(matches!(
            backend.availability(),
            Availability::QuotaExhausted { used: 0, limit: 0 }
        ));
    }

    #[tokio::test]
    async fn test_exhausted_predict_fails_fast() {
        let backend = GeminiBackend::new("key", 0, Duration::from_secs(5));
        let err = backend.predict("text").await.unwrap_err();
        assert!(matches!(err, BackendError::QuotaExceeded(_)));
        // Usage untouched by the failed call
        assert_eq!(backend.quota_usage().used, 0);
    }
}
