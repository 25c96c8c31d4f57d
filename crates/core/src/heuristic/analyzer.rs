use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use crate::backend::types::round4;
use crate::backend::{BackendAux, BackendResult};
use crate::heuristic::patterns::{
    CAPS_WORD, COMPILED_CLICKBAIT, EMOTIONAL_WORDS, EMPHATIC_RUN, WORD_TOKEN,
};
use crate::heuristic::{Indicator, Severity};

/// Sub-score weights summed into the fake probability.
const WEIGHT_EMOTIONAL: f64 = 0.25;
const WEIGHT_CLICKBAIT: f64 = 0.35;
const WEIGHT_PUNCTUATION: f64 = 0.20;
const WEIGHT_CAPS: f64 = 0.20;

/// Maximum examples carried per indicator.
const MAX_MATCHES: usize = 5;

pub const BACKEND_NAME: &str = "heuristic";

/// Deterministic rule-based analyzer.
///
/// `analyze` is a pure function of the input text: identical input yields
/// identical scores, indicators and matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAnalyzer;

impl HeuristicAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Score the text. Never fails; empty or whitespace-only input yields a
    /// zero-probability, zero-confidence result with no indicator details.
    pub fn analyze(&self, text: &str) -> BackendResult {
        let start = Instant::now();

        if text.trim().is_empty() {
            return Self::empty_result(start.elapsed().as_secs_f64());
        }

        let text_lower = text.to_lowercase();
        let text_stripped = text.trim();

        let emotional = Self::analyze_emotional_language(&text_lower);
        let clickbait = Self::analyze_clickbait_patterns(&text_lower);
        let punctuation = Self::analyze_excessive_punctuation(text_stripped);
        let caps = Self::analyze_caps_ratio(text_stripped);

        let indicators: BTreeMap<String, f64> = [
            ("emotional_language", emotional.score),
            ("clickbait_patterns", clickbait.score),
            ("excessive_punctuation", punctuation.score),
            ("caps_ratio", caps.score),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let fake_probability = emotional.score * WEIGHT_EMOTIONAL
            + clickbait.score * WEIGHT_CLICKBAIT
            + punctuation.score * WEIGHT_PUNCTUATION
            + caps.score * WEIGHT_CAPS;

        // Scores clustered near 0.5 are inconclusive; extremes are confident,
        // capped below full certainty.
        let avg_extremity = indicators
            .values()
            .map(|score| (score - 0.5).abs() * 2.0)
            .sum::<f64>()
            / indicators.len() as f64;
        let confidence = (0.5 + avg_extremity * 0.5).min(0.85);

        BackendResult {
            backend: BACKEND_NAME.to_string(),
            fake_probability: round4(fake_probability),
            confidence: round4(confidence),
            processing_time: round4(start.elapsed().as_secs_f64()),
            aux: BackendAux::Heuristic {
                indicators,
                indicator_details: vec![emotional, clickbait, punctuation, caps],
            },
        }
    }

    fn analyze_emotional_language(text_lower: &str) -> Indicator {
        let words: BTreeSet<&str> = WORD_TOKEN
            .find_iter(text_lower)
            .map(|m| m.as_str())
            .collect();
        let matches: Vec<String> = words
            .iter()
            .filter(|w| EMOTIONAL_WORDS.contains(**w))
            .map(|w| w.to_string())
            .collect();

        let score = if words.is_empty() {
            0.0
        } else {
            let density = matches.len() as f64 / words.len() as f64;
            (density * 33.0).min(1.0)
        };
        let score = round4(score);

        Indicator {
            name: "Emotional Language".to_string(),
            score,
            severity: Severity::from_score(score),
            description: format!("Found {} emotionally charged words", matches.len()),
            matches: matches.into_iter().take(MAX_MATCHES).collect(),
        }
    }

    fn analyze_clickbait_patterns(text_lower: &str) -> Indicator {
        let matches: Vec<String> = COMPILED_CLICKBAIT
            .iter()
            .flat_map(|re| re.find_iter(text_lower).map(|m| m.as_str().to_string()))
            .collect();

        let score = match matches.len() {
            0 => 0.0,
            1 => 0.4,
            2 => 0.7,
            _ => 1.0,
        };

        Indicator {
            name: "Clickbait Patterns".to_string(),
            score,
            severity: Severity::from_score(score),
            description: format!("Found {} clickbait pattern(s)", matches.len()),
            matches: matches.into_iter().take(MAX_MATCHES).collect(),
        }
    }

    fn analyze_excessive_punctuation(text: &str) -> Indicator {
        let total_chars = text.chars().count();
        if total_chars == 0 {
            return Indicator {
                name: "Excessive Punctuation".to_string(),
                score: 0.0,
                severity: Severity::Low,
                description: "No text to analyze".to_string(),
                matches: vec![],
            };
        }

        let exclamations = text.chars().filter(|c| *c == '!').count();
        let questions = text.chars().filter(|c| *c == '?').count();
        let emphatic_chars = exclamations + questions;
        let repeated = EMPHATIC_RUN.find_iter(text).count();

        let ratio = emphatic_chars as f64 / total_chars as f64;

        let score = if ratio > 0.05 {
            1.0
        } else if ratio > 0.02 {
            0.5 + (ratio - 0.02) / 0.03 * 0.5
        } else {
            ratio / 0.02 * 0.5
        };
        let score = round4((score + repeated as f64 * 0.1).min(1.0));

        let matches = if emphatic_chars > 0 {
            vec![format!("!×{}", exclamations), format!("?×{}", questions)]
        } else {
            vec![]
        };

        Indicator {
            name: "Excessive Punctuation".to_string(),
            score,
            severity: Severity::from_score(score),
            description: format!(
                "Found {}x '!' and {}x '?' ({:.1}% of text)",
                exclamations,
                questions,
                ratio * 100.0
            ),
            matches,
        }
    }

    fn analyze_caps_ratio(text: &str) -> Indicator {
        let total_letters = text.chars().filter(|c| c.is_alphabetic()).count();
        if total_letters == 0 {
            return Indicator {
                name: "ALL CAPS Usage".to_string(),
                score: 0.0,
                severity: Severity::Low,
                description: "No letters to analyze".to_string(),
                matches: vec![],
            };
        }

        let uppercase = text.chars().filter(|c| c.is_uppercase()).count();
        let ratio = uppercase as f64 / total_letters as f64;

        let caps_words: Vec<String> = CAPS_WORD
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();

        let score = if ratio > 0.5 {
            1.0
        } else if ratio > 0.3 {
            0.5 + (ratio - 0.3) / 0.2 * 0.5
        } else {
            ratio / 0.3 * 0.5
        };
        let score = round4(score);

        Indicator {
            name: "ALL CAPS Usage".to_string(),
            score,
            severity: Severity::from_score(score),
            description: format!(
                "{:.1}% uppercase letters, {} ALL CAPS words",
                ratio * 100.0,
                caps_words.len()
            ),
            matches: caps_words.into_iter().take(MAX_MATCHES).collect(),
        }
    }

    fn empty_result(processing_time: f64) -> BackendResult {
        let indicators: BTreeMap<String, f64> = [
            "emotional_language",
            "clickbait_patterns",
            "excessive_punctuation",
            "caps_ratio",
        ]
        .into_iter()
        .map(|k| (k.to_string(), 0.0))
        .collect();

        BackendResult {
            backend: BACKEND_NAME.to_string(),
            fake_probability: 0.0,
            confidence: 0.0,
            processing_time: round4(processing_time),
            aux: BackendAux::Heuristic {
                indicators,
                indicator_details: vec![],
            },
        }
    }
}
