//! Deterministic answer heuristics for the local tier. No LLM call.
//!
//! All signals are in 0.0 – 1.0.

use std::collections::HashSet;

use crate::interview::models::BehavioralMetrics;

const SITUATION_CUES: &[&str] = &["situation", "background", "context", "when ", "at that time"];
const TASK_CUES: &[&str] = &["task", "responsib", "my role", "expected to", "needed to", "goal"];
const ACTION_CUES: &[&str] = &[
    "implemented",
    "built",
    "decided",
    "i did",
    "used",
    "applied",
    "took",
    "led",
];
const RESULT_CUES: &[&str] = &[
    "result",
    "outcome",
    "achieved",
    "learned",
    "improved",
    "reduced",
    "increased",
];

const OUTCOME_WORDS: &[&str] = &[
    "result",
    "outcome",
    "achieved",
    "improved",
    "increased",
    "decreased",
    "reduced",
];

const POSITIVE_CUES: &[&str] = &[
    "good",
    "great",
    "excellent",
    "success",
    "achieved",
    "improved",
    "confident",
];
const NEGATIVE_CUES: &[&str] = &[
    "bad",
    "failed",
    "not sure",
    "i guess",
    "maybe",
    "problem",
    "don't know",
];

/// Minimum relevance granted to any non-empty answer when no keywords are expected.
const OVERLAP_FLOOR: f64 = 0.3;

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Share of `keywords` that appear in `answer` (case-insensitive substring match).
pub fn keyword_coverage(answer: &str, keywords: &[String]) -> Option<f64> {
    let keywords: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return None;
    }
    let answer_lower = answer.to_lowercase();
    let hits = keywords.iter().filter(|k| answer_lower.contains(k.as_str())).count();
    Some(hits as f64 / keywords.len() as f64)
}

/// Question/answer word overlap, doubled and bounded to [OVERLAP_FLOOR, 1.0].
pub fn word_overlap(question: &str, answer: &str) -> f64 {
    let tokens = |s: &str| -> HashSet<String> {
        s.split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2)
            .map(str::to_lowercase)
            .collect()
    };
    let question_words = tokens(question);
    if question_words.is_empty() {
        return 0.5;
    }
    let common = question_words.intersection(&tokens(answer)).count();
    (common as f64 / question_words.len() as f64 * 2.0).clamp(OVERLAP_FLOOR, 1.0)
}

/// Relevance: keyword coverage when keywords are expected, otherwise word overlap.
pub fn relevance(question: &str, answer: &str, keywords: &[String]) -> f64 {
    keyword_coverage(answer, keywords).unwrap_or_else(|| word_overlap(question, answer))
}

/// Length plus bonuses for numbers, metrics and named outcomes.
pub fn depth(answer: &str) -> f64 {
    let lower = answer.to_lowercase();
    let has_numbers = answer.chars().any(|c| c.is_ascii_digit());
    let has_metrics = answer.contains('%') || answer.contains('$');
    let has_outcomes = OUTCOME_WORDS.iter().any(|w| lower.contains(w));

    let mut score = (word_count(answer) as f64 / 100.0).min(1.0);
    if has_numbers {
        score += 0.2;
    }
    if has_metrics {
        score += 0.2;
    }
    if has_outcomes {
        score += 0.1;
    }
    score.min(1.0)
}

/// Share of the four STAR components (Situation, Task, Action, Result) present.
pub fn star_coverage(answer: &str) -> f64 {
    let lower = answer.to_lowercase();
    let present = [SITUATION_CUES, TASK_CUES, ACTION_CUES, RESULT_CUES]
        .iter()
        .filter(|cues| cues.iter().any(|c| lower.contains(c)))
        .count();
    present as f64 / 4.0
}

/// 1.0 when positive cues dominate, 0.0 when negative cues dominate, else 0.5.
pub fn tone(answer: &str) -> f64 {
    let lower = answer.to_lowercase();
    let positive = POSITIVE_CUES.iter().filter(|w| lower.contains(*w)).count();
    let negative = NEGATIVE_CUES.iter().filter(|w| lower.contains(*w)).count();
    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => 1.0,
        std::cmp::Ordering::Less => 0.0,
        std::cmp::Ordering::Equal => 0.5,
    }
}

/// Delivery score from speech metrics. Ideal pace is 100 – 200 wpm.
pub fn speech_communication(metrics: &BehavioralMetrics) -> f64 {
    let mut score = 1.0;
    score -= (metrics.filler_words as f64 * 0.03).min(0.3);
    score -= (metrics.pause_count as f64 * 0.02).min(0.2);
    if metrics.speech_rate < 100.0 || metrics.speech_rate > 200.0 {
        score -= 0.1;
    }
    score.clamp(0.0, 1.0)
}

/// Confidence from wording tone and eye contact.
pub fn confidence(answer: &str, metrics: &BehavioralMetrics) -> f64 {
    (tone(answer) * 0.6 + metrics.eye_contact.clamp(0.0, 1.0) * 0.4).clamp(0.0, 1.0)
}
