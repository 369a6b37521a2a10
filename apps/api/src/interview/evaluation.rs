//! Answer evaluation: four bounded scores plus a short note.

use async_trait::async_trait;
use serde_json::Value;

use crate::interview::coerce;
use crate::interview::fallback::TieredTask;
use crate::interview::heuristics;
use crate::interview::models::{Answer, CandidateProfile, Evaluation, Question};
use crate::interview::prompts;
use crate::llm_client::extract::extract_json;
use crate::llm_client::LlmClient;

const TEMPERATURE: f64 = 0.0;
const MAX_TOKENS: u32 = 200;

/// Used for any score the model leaves out.
const DEFAULT_SCORE: i64 = 70;
const DEFAULT_NOTES: &str = "Baseline evaluation.";

const SCORE_KEYS: [&str; 4] = ["technical", "communication", "confidence", "relevance"];

pub struct AnswerEvaluation<'a> {
    pub question: &'a Question,
    pub answer: &'a Answer,
    pub profile: &'a CandidateProfile,
}

#[async_trait]
impl TieredTask for AnswerEvaluation<'_> {
    type Output = Evaluation;

    fn name(&self) -> &'static str {
        "evaluation"
    }

    async fn remote(&self, llm: &LlmClient) -> Option<Evaluation> {
        if !llm.is_available() {
            return None;
        }
        let request = prompts::evaluation(
            &self.question.text,
            &self.answer.transcript,
            &self.question.expected_keywords,
            self.profile,
        )
        .into_request(TEMPERATURE, MAX_TOKENS);
        parse_evaluation(&llm.complete(&request).await)
    }

    fn local(&self) -> Option<Evaluation> {
        Some(local_evaluation(self.question, self.answer))
    }

    fn fallback(&self) -> Evaluation {
        Evaluation::bounded(70, 70, 65, 70, "Evaluation using fallback system.")
    }
}

/// Coerces an LLM reply into an `Evaluation`. Missing scores default to 70,
/// every score is clamped into 0–100. An object carrying none of the four
/// scores is not an evaluation and is rejected.
pub fn parse_evaluation(text: &str) -> Option<Evaluation> {
    let Value::Object(obj) = extract_json(text)? else {
        return None;
    };
    if !SCORE_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return None;
    }

    let score = |key: &str| coerce::integer_field(&obj, key).unwrap_or(DEFAULT_SCORE);
    let notes = coerce::text(&obj, &["short_notes", "notes"]);

    Some(Evaluation::bounded(
        score("technical"),
        score("communication"),
        score("confidence"),
        score("relevance"),
        notes.as_deref().unwrap_or(DEFAULT_NOTES),
    ))
}

/// Keyword, depth, STAR and delivery heuristics. Deterministic for a given answer.
pub fn local_evaluation(question: &Question, answer: &Answer) -> Evaluation {
    let transcript = answer.transcript.trim();
    if transcript.is_empty() {
        return Evaluation::bounded(50, 70, 70, 50, "No answer provided.");
    }

    let relevance = heuristics::relevance(&question.text, transcript, &question.expected_keywords);
    let depth = heuristics::depth(transcript);
    let star = heuristics::star_coverage(transcript);
    let technical = relevance * 0.5 + depth * 0.3 + star * 0.2;
    let communication = heuristics::speech_communication(&answer.metrics);
    let confidence = heuristics::confidence(transcript, &answer.metrics);

    let scaled = |x: f64| (x * 100.0).round() as i64;
    Evaluation::bounded(
        scaled(technical),
        scaled(communication),
        scaled(confidence),
        scaled(relevance),
        &local_notes(technical, relevance, communication, star),
    )
}

fn local_notes(technical: f64, relevance: f64, communication: f64, star: f64) -> String {
    let mut notes = vec![if technical >= 0.8 {
        "Strong technical depth."
    } else if technical >= 0.6 {
        "Adequate technical content; add specifics."
    } else {
        "Technical content is thin; cite concrete examples."
    }];
    if relevance < 0.5 {
        notes.push("Stay closer to the question.");
    }
    if communication < 0.7 {
        notes.push("Reduce filler words and pauses.");
    }
    if star < 0.5 {
        notes.push("Structure the answer as situation, task, action, result.");
    }
    format!("Local heuristic: {}", notes.join(" "))
}
