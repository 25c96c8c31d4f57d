//! Deterministic rule-based text scorer.
//!
//! Pure function of the input string: no I/O, no randomness. Four indicator
//! sub-scores (emotional language, clickbait patterns, excessive punctuation,
//! caps ratio) are combined by fixed weights into a fake probability.

pub mod analyzer;
pub mod patterns;

use serde::{Deserialize, Serialize};

pub use analyzer::HeuristicAnalyzer;

/// Severity tier for an indicator score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Tier thresholds: >= 0.7 HIGH, >= 0.4 MEDIUM, else LOW.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.7 {
            Severity::High
        } else if score >= 0.4 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// A named heuristic sub-score with severity tier and example matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub name: String,
    pub score: f64,
    pub severity: Severity,
    pub description: String,
    /// Up to 5 example matches from the text.
    pub matches: Vec<String>,
}
