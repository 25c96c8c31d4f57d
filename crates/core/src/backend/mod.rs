//! Remote backend adapters behind a shared contract.
//!
//! Every backend tracks a daily quota (checked before dispatch, incremented
//! only on success) and cumulative health stats, retries transient failures
//! once, and normalizes provider output into a [`BackendResult`].

pub mod gemini;
pub mod groq;
pub mod health;
pub mod huggingface;
pub mod llm;
pub mod quota;
pub mod retry;
pub mod types;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use gemini::GeminiBackend;
pub use groq::GroqBackend;
pub use health::HealthTracker;
pub use huggingface::HuggingFaceBackend;
pub use quota::QuotaTracker;
pub use types::{BackendAux, BackendResult, BackendStatus, HealthStats, QuotaUsage};

/// Errors that can occur during a backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend not configured")]
    NotConfigured,

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

impl BackendError {
    /// Whether a single retry with backoff is worth attempting.
    ///
    /// Quota exhaustion and missing configuration are definitive; network
    /// failures, timeouts and provider-side errors may be transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BackendError::Http(_) | BackendError::Timeout(_) | BackendError::Api { .. }
        )
    }
}

/// Pre-dispatch availability of a backend, evaluated synchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    /// No credential configured.
    NotConfigured,
    /// Daily quota used up; resets at date rollover.
    QuotaExhausted { used: u32, limit: u32 },
}

/// Uniform contract over heterogeneous scoring backends.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Stable backend identifier ("huggingface", "gemini", "groq").
    fn name(&self) -> &str;

    /// Availability evaluated before dispatch; never performs I/O.
    fn availability(&self) -> Availability;

    fn is_available(&self) -> bool {
        matches!(self.availability(), Availability::Available)
    }

    /// Current daily quota counters.
    fn quota_usage(&self) -> QuotaUsage;

    /// Cumulative health stats over the process lifetime.
    fn health_stats(&self) -> HealthStats;

    /// Score the text. Fails with [`BackendError`]; malformed provider
    /// output degrades to a neutral result instead of failing.
    async fn predict(&self, text: &str) -> Result<BackendResult, BackendError>;
}
