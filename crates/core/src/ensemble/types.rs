use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::backend::{BackendStatus, HealthStats};
use crate::config::EnsembleWeights;
use crate::heuristic::Indicator;

/// Final tri-state classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "FAKE")]
    Fake,
    #[serde(rename = "REAL")]
    Real,
    #[serde(rename = "UNCERTAIN")]
    Uncertain,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Fake => "FAKE",
            Verdict::Real => "REAL",
            Verdict::Uncertain => "UNCERTAIN",
        };
        f.write_str(s)
    }
}

/// One backend's contribution to the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub model_name: String,
    pub fake_probability: f64,
    pub confidence: f64,
    pub processing_time: f64,
    pub weight: f64,
}

/// The aggregated verdict returned to the caller. Immutable once created;
/// this is also the value stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: Verdict,
    pub fake_probability: f64,
    pub confidence: f64,
    pub models_used: Vec<String>,
    pub model_scores: Vec<ModelScore>,
    pub indicators: BTreeMap<String, f64>,
    pub indicator_details: Vec<Indicator>,
    pub explanation: String,
    pub processing_time: f64,
    pub timestamp: DateTime<Utc>,
    pub cached: bool,
}

/// Overall service status for dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    /// At least one remote backend is healthy.
    Healthy,
    /// Heuristic-only operation.
    Degraded,
}

/// Health snapshot across all backends.
#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub overall_status: SystemStatus,
    pub active_models: Vec<String>,
    pub heuristic: BackendStatus,
    pub backends: BTreeMap<String, HealthStats>,
    pub weights: EnsembleWeights,
}
