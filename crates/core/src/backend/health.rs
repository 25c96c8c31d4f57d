use chrono::{DateTime, Utc};
use std::sync::Mutex;

use super::types::{BackendStatus, HealthStats, QuotaUsage};

#[derive(Debug, Default)]
struct HealthState {
    success_count: u64,
    error_count: u64,
    total_latency: f64,
    last_success: Option<DateTime<Utc>>,
}

/// Cumulative success/error counters for one backend.
#[derive(Debug, Default)]
pub struct HealthTracker {
    inner: Mutex<HealthState>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, latency_secs: f64) {
        let mut state = self.inner.lock().unwrap();
        state.success_count += 1;
        state.total_latency += latency_secs;
        state.last_success = Some(Utc::now());
    }

    pub fn record_error(&self) {
        let mut state = self.inner.lock().unwrap();
        state.error_count += 1;
    }

    pub fn stats(&self, available: bool, quota: QuotaUsage) -> HealthStats {
        let state = self.inner.lock().unwrap();
        let total = state.success_count + state.error_count;
        HealthStats {
            status: if available {
                BackendStatus::Healthy
            } else {
                BackendStatus::Unavailable
            },
            last_success: state.last_success,
            success_rate: if total > 0 {
                state.success_count as f64 / total as f64 * 100.0
            } else {
                100.0
            },
            avg_latency: if state.success_count > 0 {
                state.total_latency / state.success_count as f64
            } else {
                0.0
            },
            quota,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dummy_quota() -> QuotaUsage {
        QuotaUsage {
            used: 0,
            total: 10,
            remaining: 10,
            percentage: 0.0,
            reset_date: Utc::now().date_naive(),
        }
    }

    #[test]
    fn test_untouched_tracker_reports_full_success_rate() {
        let health = HealthTracker::new();
        let stats = health.stats(true, dummy_quota());

        assert_eq!(stats.status, BackendStatus::Healthy);
        assert_eq!(stats.success_rate, 100.0);
        assert_eq!(stats.avg_latency, 0.0);
        assert!(stats.last_success.is_none());
    }

    #[test]
    fn test_success_rate_and_latency() {
        let health = HealthTracker::new();
        health.record_success(2.0);
        health.record_success(4.0);
        health.record_error();

        let stats = health.stats(true, dummy_quota());
        assert!((stats.success_rate - 66.666).abs() < 0.01);
        assert_eq!(stats.avg_latency, 3.0);
        assert!(stats.last_success.is_some());
    }

    #[test]
    fn test_unavailable_status() {
        let health = HealthTracker::new();
        let stats = health.stats(false, dummy_quota());
        assert_eq!(stats.status, BackendStatus::Unavailable);
    }
}
