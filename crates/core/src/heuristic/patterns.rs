//! Lexicon and compiled patterns shared by all heuristic analyses.
//!
//! Built once at startup and never mutated afterwards.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::collections::BTreeSet;

/// Sensational and absolutist words counted by the emotional-language
/// indicator. Matching is over distinct lowercase word tokens.
pub static EMOTIONAL_WORDS: Lazy<BTreeSet<&'static str>> = Lazy::new(|| {
    [
        "shocking",
        "unbelievable",
        "incredible",
        "astonishing",
        "mindblowing",
        "jaw-dropping",
        "bombshell",
        "explosive",
        "stunning",
        "outrageous",
        "terrifying",
        "horrifying",
        "alarming",
        "devastating",
        "catastrophic",
        "dangerous",
        "deadly",
        "crisis",
        "emergency",
        "urgent",
        "disgraceful",
        "scandalous",
        "corrupt",
        "evil",
        "sinister",
        "betrayal",
        "conspiracy",
        "coverup",
        "exposed",
        "revealed",
        "amazing",
        "revolutionary",
        "breakthrough",
        "miracle",
        "secret",
        "banned",
        "censored",
        "forbidden",
        "hidden",
        "suppressed",
        "never",
        "always",
        "everyone",
        "nobody",
        "completely",
        "totally",
        "absolutely",
        "definitely",
        "proven",
        "confirmed",
    ]
    .into_iter()
    .collect()
});

/// Canonical clickbait phrasings, matched case-insensitively.
const CLICKBAIT_PATTERNS: &[&str] = &[
    r"you\s+won'?t\s+believe",
    r"what\s+happens?\s+next",
    r"doctors?\s+hate\s+(him|her|this|them)",
    r"this\s+one\s+(simple|weird|strange)\s+trick",
    r"the\s+truth\s+about",
    r"exposed:?\s+",
    r"breaking:?\s+",
    r"must\s+(see|read|watch)",
    r"click\s+here\s+to",
    r"share\s+before\s+(it'?s?\s+)?deleted",
    r"they\s+don'?t\s+want\s+you\s+to\s+know",
    r"is\s+this\s+the\s+end\s+of",
    r"finally\s+revealed",
    r"\d+\s+reasons?\s+why",
    r"number\s+\d+\s+will\s+(shock|surprise|amaze)",
];

/// Compiled clickbait patterns.
pub static COMPILED_CLICKBAIT: Lazy<Vec<Regex>> = Lazy::new(|| {
    CLICKBAIT_PATTERNS
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).expect("invalid clickbait pattern"))
        .collect()
});

/// Lowercase word tokens.
pub static WORD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-z]+\b").unwrap());

/// Runs of two or more `!`/`?` characters.
pub static EMPHATIC_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[!?]{2,}").unwrap());

/// Words written in ALL CAPS (3+ letters).
pub static CAPS_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{3,}\b").unwrap());
