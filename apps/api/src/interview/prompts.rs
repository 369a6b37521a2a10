// Prompt builders for the interview tasks.
// Every builder is a pure function of its inputs: identical inputs give
// byte-identical prompts and therefore identical cache fingerprints.

use serde_json::json;

use crate::interview::models::{truncate_chars, CandidateProfile, InterviewType, Persona};
use crate::interview::scoring::ScoreAverages;
use crate::llm_client::prompts::{JSON_ONLY_RULES, PLAIN_TEXT_RULES};
use crate::llm_client::{ChatMessage, CompletionRequest};

/// Skills sent with question-generation prompts.
pub const MAX_PROMPT_SKILLS: usize = 10;
/// Skills sent with evaluation prompts.
pub const MAX_SUMMARY_SKILLS: usize = 5;
/// Project names sent with question-generation prompts.
pub const MAX_PROMPT_PROJECTS: usize = 3;
/// Transcript characters sent with any prompt.
pub const MAX_TRANSCRIPT_CHARS: usize = 2000;

/// (system, user) instruction pair for one task invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

impl PromptPair {
    pub fn into_request(self, temperature: f64, max_tokens: u32) -> CompletionRequest {
        CompletionRequest {
            messages: vec![ChatMessage::system(self.system), ChatMessage::user(self.user)],
            temperature,
            max_tokens,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Question generation
// ────────────────────────────────────────────────────────────────────────────

const QUESTIONS_SYSTEM: &str = "You are a senior technical interviewer. \
    Output exactly 7 interview questions as a JSON array. \
    Each question object must contain: id, text, followups, type, difficulty, \
    expected_keywords, expected_length, ideal_answer. \
    Keep text concise. Use a {tone} when wording questions.";

const QUESTIONS_USER_TEMPLATE: &str = r#"PROFILE:
{profile_json}

INTERVIEW TYPE: {interview_type}

Rules:
- Produce exactly 7 questions.
- Keep wording <= 25 words.
- Followups <= 12 words.
- type is one of "behavioral", "technical", "mixed".
- difficulty is one of "easy", "medium", "hard".
- expected_length is one of "short", "medium", "long".
- expected_keywords must be concise.
- Output ONLY a JSON array."#;

pub fn question_generation(
    profile: &CandidateProfile,
    persona: Persona,
    interview_type: InterviewType,
) -> PromptPair {
    let mut compact = json!({
        "role": profile.role_or_default(),
        "skills": profile.skills.iter().take(MAX_PROMPT_SKILLS).collect::<Vec<_>>(),
        "experience_level": profile.experience.level.label(),
        "experience_years": profile.experience.years,
    });
    if !profile.projects.is_empty() {
        compact["projects"] = json!(profile
            .projects
            .iter()
            .take(MAX_PROMPT_PROJECTS)
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>());
    }

    let profile_json = serde_json::to_string_pretty(&compact).unwrap_or_default();

    PromptPair {
        system: format!(
            "{} {}",
            QUESTIONS_SYSTEM.replace("{tone}", persona.tone()),
            JSON_ONLY_RULES
        ),
        user: QUESTIONS_USER_TEMPLATE
            .replace("{profile_json}", &profile_json)
            .replace("{interview_type}", interview_type.as_str()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluation
// ────────────────────────────────────────────────────────────────────────────

const EVALUATION_SYSTEM: &str = "You grade interview answers. Respond with one JSON object \
    with keys: technical (integer 0-100), communication (integer 0-100), \
    confidence (integer 0-100), relevance (integer 0-100), short_notes (<= 40 words).";

pub fn evaluation(
    question_text: &str,
    transcript: &str,
    expected_keywords: &[String],
    profile: &CandidateProfile,
) -> PromptPair {
    let summary = json!({
        "role": profile.role_or_default(),
        "skills": profile.skills.iter().take(MAX_SUMMARY_SKILLS).collect::<Vec<_>>(),
    });
    let keywords = if expected_keywords.is_empty() {
        "N/A".to_string()
    } else {
        expected_keywords.join(", ")
    };

    PromptPair {
        system: format!("{EVALUATION_SYSTEM} {JSON_ONLY_RULES}"),
        user: format!(
            "QUESTION: {question_text}\nANSWER: {}\nPROFILE: {summary}\nKEYWORDS: {keywords}",
            truncate_chars(transcript, MAX_TRANSCRIPT_CHARS)
        ),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Improvement
// ────────────────────────────────────────────────────────────────────────────

const IMPROVEMENT_SYSTEM: &str = "Rewrite the candidate's interview answer as a short \
    improved answer of 40-70 words, first person, concrete and professional.";

pub fn improvement(question_text: &str, transcript: &str, role: &str) -> PromptPair {
    PromptPair {
        system: format!("{IMPROVEMENT_SYSTEM} {PLAIN_TEXT_RULES}"),
        user: format!(
            "ROLE: {role}\nQUESTION: {question_text}\nORIGINAL ANSWER: {}\n\n\
             Provide a concise, professional improved version.",
            truncate_chars(transcript, MAX_TRANSCRIPT_CHARS)
        ),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Final report
// ────────────────────────────────────────────────────────────────────────────

const REPORT_SYSTEM: &str = r#"You are an interview report generator. Output ONE JSON object:
{
 "overall_summary": "...",
 "technical_strengths": ["..."],
 "technical_gaps": ["..."],
 "communication_score": 0,
 "behavioral_score": 0,
 "improved_answers": [{"id": "q1", "improved": "..."}],
 "recommendations": ["..."]
}
Generate concise insights."#;

/// One graded answer as sent to the report prompt.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReportLine<'a> {
    pub id: &'a str,
    pub question: &'a str,
    pub technical: u8,
    pub communication: u8,
    pub confidence: u8,
    pub notes: &'a str,
}

pub fn final_report(lines: &[ReportLine<'_>], averages: &ScoreAverages) -> PromptPair {
    let session_json = serde_json::to_string_pretty(lines).unwrap_or_default();

    PromptPair {
        system: format!("{REPORT_SYSTEM} {JSON_ONLY_RULES}"),
        user: format!(
            "SESSION DATA:\n{session_json}\n\nAverage Scores:\n\
             - Technical: {:.1}\n- Communication: {:.1}\n\
             - Confidence: {:.1}\n- Relevance: {:.1}\n\n\
             Generate a comprehensive report.",
            averages.avg_technical,
            averages.avg_communication,
            averages.avg_confidence,
            averages.avg_relevance
        ),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Interviewer reply
// ────────────────────────────────────────────────────────────────────────────

const REPLY_SYSTEM: &str = "You are a job interviewer reacting to the candidate's last answer. \
    Reply in one or two short sentences using a {tone}. Do not ask a new main question.";

pub fn interviewer_reply(persona: Persona, question_text: &str, transcript: &str) -> PromptPair {
    PromptPair {
        system: format!(
            "{} {}",
            REPLY_SYSTEM.replace("{tone}", persona.tone()),
            PLAIN_TEXT_RULES
        ),
        user: format!(
            "QUESTION: {question_text}\nCANDIDATE ANSWER: {}",
            truncate_chars(transcript, MAX_TRANSCRIPT_CHARS)
        ),
    }
}
