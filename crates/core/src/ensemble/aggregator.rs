//! Weighted aggregation of backend results into a single verdict.

use chrono::Utc;
use std::collections::BTreeMap;

use crate::backend::types::round4;
use crate::backend::{BackendAux, BackendResult};
use crate::config::{EnsembleConfig, EnsembleWeights};
use crate::ensemble::types::{ModelScore, Prediction, Verdict};
use crate::heuristic::Indicator;

/// Weight applied to backends outside the configured categories.
const DEFAULT_WEIGHT: f64 = 0.1;

/// Probability spread below which backends are reported as agreeing.
const AGREEMENT_SPREAD: f64 = 0.2;

/// Indicator score at or above which an indicator is a "key concern".
const CONCERN_THRESHOLD: f64 = 0.5;

pub struct Aggregator {
    weights: EnsembleWeights,
    fake_threshold: f64,
    real_threshold: f64,
    min_confidence: f64,
}

impl Aggregator {
    pub fn new(config: &EnsembleConfig) -> Self {
        Self {
            weights: config.weights,
            fake_threshold: config.fake_threshold,
            real_threshold: config.real_threshold,
            min_confidence: config.min_confidence,
        }
    }

    /// Combine whichever backends responded into one verdict.
    ///
    /// The mean is weighted over responders only: the divisor is the sum of
    /// the responders' weights, not the configured total, so a lone responder
    /// fully determines the outcome. An empty list yields the fixed fallback
    /// verdict.
    pub fn aggregate(&self, results: &[BackendResult]) -> Prediction {
        if results.is_empty() {
            return self.fallback_prediction();
        }

        let mut weighted_prob = 0.0;
        let mut weighted_conf = 0.0;
        let mut total_weight = 0.0;

        let mut models_used = Vec::with_capacity(results.len());
        let mut model_scores = Vec::with_capacity(results.len());
        let mut indicators: BTreeMap<String, f64> = BTreeMap::new();
        let mut indicator_details: Vec<Indicator> = vec![];

        for result in results {
            let weight = self.weight_for(&result.backend);

            weighted_prob += result.fake_probability * weight;
            weighted_conf += result.confidence * weight;
            total_weight += weight;

            models_used.push(result.backend.clone());
            model_scores.push(ModelScore {
                model_name: result.backend.clone(),
                fake_probability: result.fake_probability,
                confidence: result.confidence,
                processing_time: result.processing_time,
                weight,
            });

            if let BackendAux::Heuristic {
                indicators: ind,
                indicator_details: details,
            } = &result.aux
            {
                indicators = ind.clone();
                indicator_details = details.clone();
            }
        }

        let (fake_probability, confidence) = if total_weight > 0.0 {
            (weighted_prob / total_weight, weighted_conf / total_weight)
        } else {
            (0.5, 0.5)
        };

        let prediction = self.determine_verdict(fake_probability, confidence);
        let explanation = self.generate_explanation(
            prediction,
            fake_probability,
            confidence,
            &model_scores,
            &indicators,
        );

        Prediction {
            prediction,
            fake_probability: round4(fake_probability),
            confidence: round4(confidence),
            models_used,
            model_scores,
            indicators,
            indicator_details,
            explanation,
            processing_time: 0.0,
            timestamp: Utc::now(),
            cached: false,
        }
    }

    /// The two LLM providers share one weight category.
    fn weight_for(&self, backend: &str) -> f64 {
        match backend {
            "heuristic" => self.weights.heuristic,
            "huggingface" => self.weights.huggingface,
            "gemini" | "groq" => self.weights.llm,
            _ => DEFAULT_WEIGHT,
        }
    }

    /// Confidence gate first, then the probability thresholds. The band
    /// between the thresholds is UNCERTAIN.
    fn determine_verdict(&self, fake_probability: f64, confidence: f64) -> Verdict {
        if confidence < self.min_confidence {
            return Verdict::Uncertain;
        }
        if fake_probability >= self.fake_threshold {
            Verdict::Fake
        } else if fake_probability <= self.real_threshold {
            Verdict::Real
        } else {
            Verdict::Uncertain
        }
    }

    /// Deterministic, informational-only explanation text. Never feeds back
    /// into the decision.
    fn generate_explanation(
        &self,
        prediction: Verdict,
        fake_probability: f64,
        confidence: f64,
        model_scores: &[ModelScore],
        indicators: &BTreeMap<String, f64>,
    ) -> String {
        let mut parts = Vec::with_capacity(4);

        parts.push(match prediction {
            Verdict::Fake => format!(
                "This article shows strong indicators of misinformation (fake probability: {:.0}%).",
                fake_probability * 100.0
            ),
            Verdict::Real => format!(
                "This article appears to be authentic (fake probability: {:.0}%).",
                fake_probability * 100.0
            ),
            Verdict::Uncertain => format!(
                "The analysis is inconclusive (fake probability: {:.0}%).",
                fake_probability * 100.0
            ),
        });

        if model_scores.len() > 1 {
            let min = model_scores
                .iter()
                .map(|m| m.fake_probability)
                .fold(f64::INFINITY, f64::min);
            let max = model_scores
                .iter()
                .map(|m| m.fake_probability)
                .fold(f64::NEG_INFINITY, f64::max);
            if max - min < AGREEMENT_SPREAD {
                parts.push("All models are in agreement.".to_string());
            } else {
                parts.push(format!(
                    "Model predictions vary from {:.0}% to {:.0}%.",
                    min * 100.0,
                    max * 100.0
                ));
            }
        }

        let concerns: Vec<String> = indicators
            .iter()
            .filter(|(_, score)| **score >= CONCERN_THRESHOLD)
            .map(|(name, _)| name.replace('_', " "))
            .collect();
        if !concerns.is_empty() {
            parts.push(format!("Key concerns: {}.", concerns.join(", ")));
        }

        if confidence < 0.7 {
            parts.push("Note: Confidence is moderate. Consider additional verification.".to_string());
        }

        parts.join(" ")
    }

    /// Fixed verdict when every backend failed, including the heuristic.
    fn fallback_prediction(&self) -> Prediction {
        Prediction {
            prediction: Verdict::Uncertain,
            fake_probability: 0.5,
            confidence: 0.0,
            models_used: vec![],
            model_scores: vec![],
            indicators: BTreeMap::new(),
            indicator_details: vec![],
            explanation: "Unable to analyze: all models failed. Please try again.".to_string(),
            processing_time: 0.0,
            timestamp: Utc::now(),
            cached: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendAux;

    fn aggregator() -> Aggregator {
        Aggregator::new(&EnsembleConfig::default())
    }

    fn result(backend: &str, prob: f64, conf: f64) -> BackendResult {
        BackendResult {
            backend: backend.to_string(),
            fake_probability: prob,
            confidence: conf,
            processing_time: 0.01,
            aux: BackendAux::None,
        }
    }

    #[test]
    fn test_empty_results_yield_fallback_verdict() {
        let prediction = aggregator().aggregate(&[]);

        assert_eq!(prediction.prediction, Verdict::Uncertain);
        assert_eq!(prediction.fake_probability, 0.5);
        assert_eq!(prediction.confidence, 0.0);
        assert!(prediction.models_used.is_empty());
        assert!(prediction.explanation.contains("all models failed"));
    }

    #[test]
    fn test_single_backend_weight_cancels() {
        let prediction = aggregator().aggregate(&[result("gemini", 0.82, 0.9)]);

        assert_eq!(prediction.fake_probability, 0.82);
        assert_eq!(prediction.confidence, 0.9);
        assert_eq!(prediction.prediction, Verdict::Fake);
    }

    #[test]
    fn test_equal_weights_average_opposites_to_half() {
        let prediction = aggregator().aggregate(&[
            result("gemini", 0.0, 0.8),
            result("groq", 1.0, 0.8),
        ]);

        assert!((prediction.fake_probability - 0.5).abs() < 1e-9);
        assert_eq!(prediction.prediction, Verdict::Uncertain);
    }

    #[test]
    fn test_weighted_mean_over_responders_only() {
        // heuristic 0.25, llm 0.35 -> (0.2*0.25 + 0.8*0.35) / 0.6
        let prediction = aggregator().aggregate(&[
            result("heuristic", 0.2, 0.8),
            result("gemini", 0.8, 0.8),
        ]);

        let expected = (0.2 * 0.25 + 0.8 * 0.35) / 0.6;
        assert!((prediction.fake_probability - round4(expected)).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_backend_gets_default_weight() {
        let prediction = aggregator().aggregate(&[
            result("heuristic", 0.0, 0.8),
            result("mystery", 1.0, 0.8),
        ]);

        let expected = (0.0 * 0.25 + 1.0 * 0.1) / 0.35;
        assert!((prediction.fake_probability - round4(expected)).abs() < 1e-4);
    }

    #[test]
    fn test_verdict_monotonicity() {
        let agg = aggregator();
        assert_eq!(agg.determine_verdict(0.7, 0.8), Verdict::Fake);
        assert_eq!(agg.determine_verdict(0.95, 0.8), Verdict::Fake);
        assert_eq!(agg.determine_verdict(0.3, 0.8), Verdict::Real);
        assert_eq!(agg.determine_verdict(0.05, 0.8), Verdict::Real);
        assert_eq!(agg.determine_verdict(0.5, 0.8), Verdict::Uncertain);
    }

    #[test]
    fn test_low_confidence_forces_uncertain() {
        let agg = aggregator();
        assert_eq!(agg.determine_verdict(0.95, 0.59), Verdict::Uncertain);
        assert_eq!(agg.determine_verdict(0.05, 0.0), Verdict::Uncertain);
    }

    #[test]
    fn test_agreement_note() {
        let prediction = aggregator().aggregate(&[
            result("heuristic", 0.75, 0.8),
            result("gemini", 0.85, 0.8),
        ]);
        assert!(prediction.explanation.contains("All models are in agreement."));
    }

    #[test]
    fn test_disagreement_reports_spread() {
        let prediction = aggregator().aggregate(&[
            result("heuristic", 0.1, 0.8),
            result("gemini", 0.9, 0.8),
        ]);
        assert!(prediction
            .explanation
            .contains("Model predictions vary from 10% to 90%."));
    }

    #[test]
    fn test_key_concerns_listed() {
        let mut indicators = BTreeMap::new();
        indicators.insert("clickbait_patterns".to_string(), 0.7);
        indicators.insert("caps_ratio".to_string(), 0.2);
        let heuristic = BackendResult {
            backend: "heuristic".to_string(),
            fake_probability: 0.8,
            confidence: 0.8,
            processing_time: 0.0,
            aux: BackendAux::Heuristic {
                indicators,
                indicator_details: vec![],
            },
        };

        let prediction = aggregator().aggregate(&[heuristic]);
        assert!(prediction.explanation.contains("Key concerns: clickbait patterns."));
        assert!(!prediction.explanation.contains("caps ratio"));
    }

    #[test]
    fn test_moderate_confidence_caution_note() {
        let prediction = aggregator().aggregate(&[result("gemini", 0.9, 0.65)]);
        assert!(prediction
            .explanation
            .contains("Consider additional verification"));
    }

    #[test]
    fn test_aggregated_values_in_unit_interval() {
        let prediction = aggregator().aggregate(&[
            result("heuristic", 1.0, 1.0),
            result("huggingface", 1.0, 1.0),
            result("gemini", 1.0, 1.0),
        ]);
        assert!((0.0..=1.0).contains(&prediction.fake_probability));
        assert!((0.0..=1.0).contains(&prediction.confidence));
    }
}
