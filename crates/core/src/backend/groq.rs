//! Groq LLM backend, secondary provider in the fallback chain.

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

pub const BACKEND_NAME: &str = "groq";

const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
const MODEL_ID: &str = "llama-3.1-8b-instant";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: &'static str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

pub struct GroqBackend {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    timeout: Duration,
    quota: QuotaTracker,
    health: HealthTracker,
}

impl GroqBackend {
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
        let url = format!("{}/chat/completions", self.api_base);

        let request = ChatRequest {
            model: MODEL_ID,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Analyze this text:\n\n{}", text),
                },
            ],
            max_tokens: 500,
            temperature: 0.1,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        debug!(chars = text.len(), "groq chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
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

    fn parse_response(response: &Value) -> LlmJudgement {
        response
            .pointer("/choices/0/message/content")
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
impl TextBackend for GroqBackend {
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
