//! Single-retry policy for transient backend failures.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use super::BackendError;

const MAX_ATTEMPTS: u32 = 2;
const BACKOFF_BASE: Duration = Duration::from_secs(1);
const BACKOFF_CAP: Duration = Duration::from_secs(5);

/// Run `op`, retrying once with exponential backoff if the failure is
/// transient. Quota and configuration errors are returned immediately.
pub async fn with_retry<T, F, Fut>(backend: &str, mut op: F) -> Result<T, BackendError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < MAX_ATTEMPTS && err.is_transient() => {
                let backoff = BACKOFF_BASE
                    .saturating_mul(2u32.saturating_pow(attempt - 1))
                    .min(BACKOFF_CAP);
                warn!(
                    backend,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "transient backend failure, retrying"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(err) => return Err(err),
        }
    }
}
