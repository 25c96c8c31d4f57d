//! Primary/secondary selection between interchangeable LLM backends.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::backend::{Availability, BackendError, BackendResult, TextBackend};
use crate::metrics;

/// Ordered preference among the LLM-style backends.
///
/// The chain tries the primary only if it reports available, falls through
/// to the secondary on any failure, and yields nothing when both are out —
/// an absent LLM contribution is not an error.
pub struct FallbackChain {
    primary: Option<Arc<dyn TextBackend>>,
    secondary: Option<Arc<dyn TextBackend>>,
}

impl FallbackChain {
    pub fn new(
        primary: Option<Arc<dyn TextBackend>>,
        secondary: Option<Arc<dyn TextBackend>>,
    ) -> Self {
        Self { primary, secondary }
    }

    pub fn backends(&self) -> impl Iterator<Item = &Arc<dyn TextBackend>> {
        self.primary.iter().chain(self.secondary.iter())
    }

    /// Run the first backend in the chain that is available and succeeds
    /// within the deadline.
    pub async fn predict(&self, text: &str, timeout: Duration) -> Option<BackendResult> {
        for backend in self.backends() {
            match backend.availability() {
                Availability::Available => {}
                Availability::NotConfigured => {
                    debug!(backend = backend.name(), "skipping unconfigured backend");
                    continue;
                }
                Availability::QuotaExhausted { used, limit } => {
                    debug!(
                        backend = backend.name(),
                        used, limit, "skipping quota-exhausted backend"
                    );
                    metrics::BACKEND_REQUESTS
                        .with_label_values(&[backend.name(), "quota"])
                        .inc();
                    continue;
                }
            }

            match tokio::time::timeout(timeout, backend.predict(text)).await {
                Ok(Ok(result)) => {
                    info!(backend = backend.name(), "LLM prediction successful");
                    metrics::BACKEND_REQUESTS
                        .with_label_values(&[backend.name(), "success"])
                        .inc();
                    metrics::BACKEND_LATENCY
                        .with_label_values(&[backend.name()])
                        .observe(result.processing_time);
                    return Some(result);
                }
                Ok(Err(BackendError::QuotaExceeded(reason))) => {
                    warn!(
                        backend = backend.name(),
                        %reason,
                        "quota exceeded, falling through"
                    );
                    metrics::BACKEND_REQUESTS
                        .with_label_values(&[backend.name(), "quota"])
                        .inc();
                }
                Ok(Err(err)) => {
                    warn!(backend = backend.name(), error = %err, "backend failed, falling through");
                    metrics::BACKEND_REQUESTS
                        .with_label_values(&[backend.name(), "error"])
                        .inc();
                }
                Err(_) => {
                    warn!(
                        backend = backend.name(),
                        timeout_secs = timeout.as_secs(),
                        "backend timed out, falling through"
                    );
                    metrics::BACKEND_REQUESTS
                        .with_label_values(&[backend.name(), "timeout"])
                        .inc();
                }
            }
        }

        debug!("no LLM backend available for this request");
        None
    }
}
