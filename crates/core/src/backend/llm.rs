//! Shared pieces of the LLM-style backends: the scoring prompt and lenient
//! parsing of the model's JSON judgement.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Deserialize;

use super::types::{clamp_unit, round4};

/// Instructions sent to both LLM providers. The response must be a single
/// JSON object so parsing stays uniform across providers.
pub const SYSTEM_PROMPT: &str = "You are a misinformation analyst. Assess whether the text \
provided by the user is likely misinformation. Consider sensational framing, unsourced or \
unverifiable claims, manipulated statistics, impersonation of authorities, and emotional \
manipulation. Respond with exactly one JSON object and nothing else, in this form: \
{\"fake_probability\": <number 0.0-1.0>, \"confidence\": <number 0.0-1.0>, \
\"reasoning\": \"<one or two short sentences>\", \"red_flags\": [\"<short phrase>\", ...]}";

/// Maximum input characters forwarded to an LLM provider.
pub const MAX_LLM_INPUT_CHARS: usize = 3000;

static JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^{}]*\}").unwrap());

#[derive(Debug, Clone, Deserialize)]
struct RawJudgement {
    #[serde(default = "neutral")]
    fake_probability: f64,
    #[serde(default = "neutral")]
    confidence: f64,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    red_flags: Vec<String>,
}

fn neutral() -> f64 {
    0.5
}

/// A model's judgement, normalized into [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct LlmJudgement {
    pub fake_probability: f64,
    pub confidence: f64,
    pub reasoning: String,
    pub red_flags: Vec<String>,
}

impl Default for LlmJudgement {
    fn default() -> Self {
        Self {
            fake_probability: 0.5,
            confidence: 0.5,
            reasoning: "Unable to analyze".to_string(),
            red_flags: vec![],
        }
    }
}

/// Parse the completion text into a judgement.
///
/// Tries the whole text as JSON first, then falls back to the first brace
///-delimited object inside it. Anything unparsable degrades to the neutral
/// default instead of failing the request.
pub fn parse_judgement(text: &str) -> LlmJudgement {
    let raw: Option<RawJudgement> = serde_json::from_str(text).ok().or_else(|| {
        JSON_OBJECT
            .find(text)
            .and_then(|m| serde_json::from_str(m.as_str()).ok())
    });

    match raw {
        Some(raw) => LlmJudgement {
            fake_probability: round4(clamp_unit(raw.fake_probability)),
            confidence: round4(clamp_unit(raw.confidence)),
            reasoning: raw.reasoning,
            red_flags: raw.red_flags,
        },
        None => LlmJudgement::default(),
    }
}

/// Truncate text at a character boundary for provider limits.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clean_json() {
        let judgement = parse_judgement(
            r#"{"fake_probability": 0.8, "confidence": 0.9, "reasoning": "sensational", "red_flags": ["caps"]}"#,
        );
        assert_eq!(judgement.fake_probability, 0.8);
        assert_eq!(judgement.confidence, 0.9);
        assert_eq!(judgement.reasoning, "sensational");
        assert_eq!(judgement.red_flags, vec!["caps".to_string()]);
    }

    #[test]
    fn test_parse_json_embedded_in_prose() {
        let judgement = parse_judgement(
            "Here is my assessment:\n{\"fake_probability\": 0.2, \"confidence\": 0.7}\nThanks!",
        );
        assert_eq!(judgement.fake_probability, 0.2);
        assert_eq!(judgement.confidence, 0.7);
    }

    #[test]
    fn test_parse_garbage_degrades_to_neutral() {
        let judgement = parse_judgement("I cannot answer that.");
        assert_eq!(judgement, LlmJudgement::default());
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let judgement = parse_judgement(r#"{"fake_probability": 3.5, "confidence": -1.0}"#);
        assert_eq!(judgement.fake_probability, 1.0);
        assert_eq!(judgement.confidence, 0.0);
    }

    #[test]
    fn test_missing_fields_default_to_neutral() {
        let judgement = parse_judgement(r#"{"reasoning": "hmm"}"#);
        assert_eq!(judgement.fake_probability, 0.5);
        assert_eq!(judgement.confidence, 0.5);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "héllo wörld";
        assert_eq!(truncate_chars(text, 5), "héllo");
        assert_eq!(truncate_chars(text, 100), text);
    }
}
