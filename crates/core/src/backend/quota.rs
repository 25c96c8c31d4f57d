use chrono::{NaiveDate, Utc};
use std::sync::Mutex;
use tracing::info;

use super::types::QuotaUsage;
use super::BackendError;

#[derive(Debug)]
struct QuotaState {
    used: u32,
    limit: u32,
    reset_date: NaiveDate,
}

/// Daily call budget for one backend.
///
/// The counter resets when the wall-clock date advances past the stored
/// reset date, and increments only on successful calls. Process-wide, one
/// instance per backend, mutated only under the internal lock.
#[derive(Debug)]
pub struct QuotaTracker {
    inner: Mutex<QuotaState>,
}

impl QuotaTracker {
    pub fn new(limit: u32) -> Self {
        Self {
            inner: Mutex::new(QuotaState {
                used: 0,
                limit,
                reset_date: Utc::now().date_naive(),
            }),
        }
    }

    fn roll_over(state: &mut QuotaState) {
        let today = Utc::now().date_naive();
        if today > state.reset_date {
            info!(date = %today, "resetting daily quota");
            state.used = 0;
            state.reset_date = today;
        }
    }

    /// Fail fast with `QuotaExceeded` before any network call is made.
    pub fn check(&self) -> Result<(), BackendError> {
        let mut state = self.inner.lock().unwrap();
        Self::roll_over(&mut state);
        if state.used >= state.limit {
            return Err(BackendError::QuotaExceeded(format!(
                "daily quota exceeded ({}/{})",
                state.used, state.limit
            )));
        }
        Ok(())
    }

    pub fn is_exhausted(&self) -> bool {
        let mut state = self.inner.lock().unwrap();
        Self::roll_over(&mut state);
        state.used >= state.limit
    }

    /// Record one successful call against the budget.
    pub fn record_use(&self) {
        let mut state = self.inner.lock().unwrap();
        Self::roll_over(&mut state);
        state.used += 1;
    }

    pub fn usage(&self) -> QuotaUsage {
        let mut state = self.inner.lock().unwrap();
        Self::roll_over(&mut state);
        QuotaUsage {
            used: state.used,
            total: state.limit,
            remaining: state.limit.saturating_sub(state.used),
            percentage: if state.limit > 0 {
                state.used as f64 / state.limit as f64 * 100.0
            } else {
                0.0
            },
            reset_date: state.reset_date,
        }
    }

    pub fn counters(&self) -> (u32, u32) {
        let mut state = self.inner.lock().unwrap();
        Self::roll_over(&mut state);
        (state.used, state.limit)
    }

    #[cfg(test)]
    fn force_state(&self, used: u32, reset_date: NaiveDate) {
        let mut state = self.inner.lock().unwrap();
        state.used = used;
        state.reset_date = reset_date;
    }
}
