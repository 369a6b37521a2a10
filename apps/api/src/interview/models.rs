//! Interview data model: profiles, questions, answers, evaluations, sessions, reports.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Candidate profile
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Junior,
    #[default]
    #[serde(rename = "Mid-Level")]
    MidLevel,
    Senior,
    #[serde(rename = "Principal/Lead")]
    PrincipalLead,
}

impl ExperienceLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "Junior",
            ExperienceLevel::MidLevel => "Mid-Level",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::PrincipalLead => "Principal/Lead",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub years: u32,
    #[serde(default)]
    pub level: ExperienceLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Résumé-derived profile. Skills are deduplicated (case-insensitive, first wins)
/// on the way in, keeping their original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub role: String,
    #[serde(default, deserialize_with = "deserialize_skills")]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Experience,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl CandidateProfile {
    pub fn new(role: impl Into<String>, skills: Vec<String>, experience: Experience) -> Self {
        Self {
            role: role.into(),
            skills: dedup_skills(skills),
            experience,
            projects: Vec::new(),
        }
    }

    /// Role with a generic default for blank input.
    pub fn role_or_default(&self) -> &str {
        let role = self.role.trim();
        if role.is_empty() {
            "Software Engineer"
        } else {
            role
        }
    }
}

fn deserialize_skills<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(dedup_skills(raw))
}

pub fn dedup_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Interview settings
// ────────────────────────────────────────────────────────────────────────────

/// Interviewer persona. Changes prompt tone wording only, never output shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    #[default]
    Neutral,
    Warm,
    Strict,
}

impl Persona {
    pub fn tone(&self) -> &'static str {
        match self {
            Persona::Neutral => "neutral, professional tone",
            Persona::Warm => "warm, encouraging tone",
            Persona::Strict => "strict, demanding, high-pressure tone",
        }
    }

    /// Prefix the local tier puts in front of templated question text.
    pub fn question_prefix(&self) -> &'static str {
        match self {
            Persona::Neutral => "",
            Persona::Warm => "I'd love to hear about ",
            Persona::Strict => "I need you to explain ",
        }
    }
}

/// Category tag of a question, and the kind of interview requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Behavioral,
    Technical,
    #[default]
    Mixed,
}

impl InterviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Behavioral => "behavioral",
            InterviewType::Technical => "technical",
            InterviewType::Mixed => "mixed",
        }
    }

    pub fn parse_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "behavioral" | "behavioural" => Some(InterviewType::Behavioral),
            "technical" => Some(InterviewType::Technical),
            "mixed" => Some(InterviewType::Mixed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "moderate" => Some(Difficulty::Medium),
            "hard" | "difficult" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ExpectedLength {
    pub fn parse_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "short" | "brief" => Some(ExpectedLength::Short),
            "medium" => Some(ExpectedLength::Medium),
            "long" | "detailed" => Some(ExpectedLength::Long),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Question / Answer / Evaluation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub followups: String,
    #[serde(rename = "type")]
    pub question_type: InterviewType,
    pub difficulty: Difficulty,
    pub expected_keywords: Vec<String>,
    pub expected_length: ExpectedLength,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal_answer: Option<String>,
}

/// Delivery metrics captured client-side while the candidate spoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehavioralMetrics {
    pub filler_words: u32,
    pub pause_count: u32,
    /// Words per minute.
    pub speech_rate: f64,
    /// Share of time looking at the camera, 0.0 – 1.0.
    pub eye_contact: f64,
}

impl Default for BehavioralMetrics {
    fn default() -> Self {
        Self {
            filler_words: 0,
            pause_count: 0,
            speech_rate: 150.0,
            eye_contact: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub transcript: String,
    #[serde(default)]
    pub metrics: BehavioralMetrics,
}

/// Max characters kept in `Evaluation::short_notes`.
pub const MAX_NOTES_CHARS: usize = 200;

/// Four bounded scores plus a short note. Produced once per answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub technical: u8,
    pub communication: u8,
    pub confidence: u8,
    pub relevance: u8,
    pub short_notes: String,
}

impl Evaluation {
    /// Builds an evaluation with every score clamped into 0–100 and the note
    /// cut to `MAX_NOTES_CHARS`.
    pub fn bounded(
        technical: i64,
        communication: i64,
        confidence: i64,
        relevance: i64,
        short_notes: &str,
    ) -> Self {
        Self {
            technical: clamp_score(technical),
            communication: clamp_score(communication),
            confidence: clamp_score(confidence),
            relevance: clamp_score(relevance),
            short_notes: truncate_chars(short_notes.trim(), MAX_NOTES_CHARS),
        }
    }
}

pub fn clamp_score(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

/// Cuts `text` to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Session
// ────────────────────────────────────────────────────────────────────────────

/// Number of questions in a complete session.
pub const QUESTIONS_PER_SESSION: usize = 7;

/// One interview: its questions plus parallel answers and evaluations.
/// Answers and evaluations only grow together, through `record`.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub profile: CandidateProfile,
    pub persona: Persona,
    pub interview_type: InterviewType,
    pub questions: Vec<Question>,
    answers: Vec<Answer>,
    evaluations: Vec<Evaluation>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        profile: CandidateProfile,
        persona: Persona,
        interview_type: InterviewType,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile,
            persona,
            interview_type,
            questions,
            answers: Vec::new(),
            evaluations: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn evaluations(&self) -> &[Evaluation] {
        &self.evaluations
    }

    pub fn record(&mut self, answer: Answer, evaluation: Evaluation) {
        self.answers.push(answer);
        self.evaluations.push(evaluation);
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    /// Answered questions paired with their evaluations, in answer order.
    pub fn graded(&self) -> impl Iterator<Item = (Option<&Question>, &Answer, &Evaluation)> {
        self.answers
            .iter()
            .zip(self.evaluations.iter())
            .map(|(a, e)| (self.question(&a.question_id), a, e))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovedAnswer {
    pub id: String,
    pub improved: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub overall_summary: String,
    pub technical_strengths: Vec<String>,
    pub technical_gaps: Vec<String>,
    pub communication_score: u8,
    pub behavioral_score: u8,
    pub improved_answers: Vec<ImprovedAnswer>,
    pub recommendations: Vec<String>,
}
