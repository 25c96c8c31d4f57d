use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::heuristic::Indicator;

/// Normalized output of one backend call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResult {
    /// Backend identifier.
    pub backend: String,
    /// Probability in [0, 1] that the text is misinformation.
    pub fake_probability: f64,
    /// Certainty in [0, 1], independent of the probability's direction.
    pub confidence: f64,
    /// Call latency in seconds.
    pub processing_time: f64,
    /// Backend-specific auxiliary data.
    #[serde(default)]
    pub aux: BackendAux,
}

/// Auxiliary payload attached to a [`BackendResult`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendAux {
    #[default]
    None,
    Heuristic {
        indicators: BTreeMap<String, f64>,
        indicator_details: Vec<Indicator>,
    },
    Sentiment {
        sentiment: String,
        raw_response: serde_json::Value,
    },
    Llm {
        reasoning: String,
        red_flags: Vec<String>,
        raw_response: serde_json::Value,
    },
}

/// Daily quota counters for a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaUsage {
    pub used: u32,
    pub total: u32,
    pub remaining: u32,
    pub percentage: f64,
    pub reset_date: NaiveDate,
}

/// Coarse backend status for dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendStatus {
    Healthy,
    Unavailable,
}

/// Cumulative health stats over the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStats {
    pub status: BackendStatus,
    pub last_success: Option<DateTime<Utc>>,
    /// Percentage of calls that succeeded; 100 when no calls were made.
    pub success_rate: f64,
    /// Average successful-call latency in seconds.
    pub avg_latency: f64,
    pub quota: QuotaUsage,
}

/// Clamp a probability or confidence into [0, 1].
pub(crate) fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Round to 4 decimal places, the precision carried in results.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
