//! Mock backend for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::backend::{
    Availability, BackendError, BackendResult, BackendStatus, HealthStats, QuotaUsage, TextBackend,
};

/// Mock implementation of the TextBackend trait.
///
/// Provides controllable behavior for testing:
/// - Queue scripted results or errors per call
/// - Override reported availability
/// - Simulate slow responses
/// - Track predicted texts for assertions
///
/// # Example
///
/// ```rust,ignore
/// use veriscan_core::testing::{fixtures, MockBackend};
///
/// let backend = MockBackend::new("gemini");
/// backend.push_result(fixtures::backend_result("gemini", 0.8, 0.9));
///
/// let result = backend.predict("some text").await?;
/// assert_eq!(result.fake_probability, 0.8);
///
/// let calls = backend.recorded_calls();
/// assert_eq!(calls, vec!["some text".to_string()]);
/// ```
pub struct MockBackend {
    name: String,
    /// Scripted responses, consumed front to back.
    responses: Mutex<VecDeque<Result<BackendResult, BackendError>>>,
    /// Reported availability.
    availability: Mutex<Availability>,
    /// Artificial latency before responding.
    delay: Mutex<Option<Duration>>,
    /// Recorded prediction inputs.
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Create a new mock that reports available and echoes a neutral result
    /// when no response is scripted.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: Mutex::new(VecDeque::new()),
            availability: Mutex::new(Availability::Available),
            delay: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful result for a future `predict` call.
    pub fn push_result(&self, result: BackendResult) {
        self.responses.lock().unwrap().push_back(Ok(result));
    }

    /// Queue an error for a future `predict` call.
    pub fn push_error(&self, error: BackendError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Override the reported availability.
    pub fn set_availability(&self, availability: Availability) {
        *self.availability.lock().unwrap() = availability;
    }

    /// Delay every `predict` response by the given duration.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Texts passed to `predict`, in call order.
    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn availability(&self) -> Availability {
        self.availability.lock().unwrap().clone()
    }

    fn quota_usage(&self) -> QuotaUsage {
        QuotaUsage {
            used: 0,
            total: 1000,
            remaining: 1000,
            percentage: 0.0,
            reset_date: Utc::now().date_naive(),
        }
    }

    fn health_stats(&self) -> HealthStats {
        HealthStats {
            status: if self.is_available() {
                BackendStatus::Healthy
            } else {
                BackendStatus::Unavailable
            },
            last_success: None,
            success_rate: 100.0,
            avg_latency: 0.0,
            quota: self.quota_usage(),
        }
    }

    async fn predict(&self, text: &str) -> Result<BackendResult, BackendError> {
        self.calls.lock().unwrap().push(text.to_string());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.responses.lock().unwrap().pop_front();
        match scripted {
            Some(response) => response,
            None => Ok(BackendResult {
                backend: self.name.clone(),
                fake_probability: 0.5,
                confidence: 0.5,
                processing_time: 0.0,
                aux: Default::default(),
            }),
        }
    }
}
