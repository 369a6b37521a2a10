//! Final report generation.
//!
//! The local report is always computed first: the remote tier fills any
//! field the model leaves out or malforms from it, so a remote report is
//! never partially empty.

use async_trait::async_trait;
use serde_json::Value;

use crate::interview::coerce::{self, Object};
use crate::interview::fallback::TieredTask;
use crate::interview::improvement::local_improvement;
use crate::interview::models::{clamp_score, truncate_chars, ImprovedAnswer, Report, Session};
use crate::interview::prompts::{self, ReportLine};
use crate::interview::scoring::ScoreAverages;
use crate::llm_client::extract::extract_json;
use crate::llm_client::LlmClient;

const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 300;

const MAX_RECOMMENDATIONS: usize = 5;
const MAX_HIGHLIGHTS: usize = 3;
const HIGHLIGHT_CHARS: usize = 80;

const REPORT_KEYS: [&str; 7] = [
    "overall_summary",
    "technical_strengths",
    "technical_gaps",
    "communication_score",
    "behavioral_score",
    "improved_answers",
    "recommendations",
];

const TECHNICAL_TIPS: [&str; 3] = [
    "Practice explaining technical concepts in simple terms",
    "Work on providing specific examples from your experience",
    "Review fundamental concepts in your field",
];
const COMMUNICATION_TIPS: [&str; 3] = [
    "Practice structuring answers with clear beginning, middle, and end",
    "Work on reducing filler words and speaking more fluently",
    "Record yourself answering questions to identify areas for improvement",
];
const CONFIDENCE_TIPS: [&str; 3] = [
    "Practice maintaining eye contact during speaking",
    "Work on speaking with a confident tone and pace",
    "Prepare answers to common interview questions to build confidence",
];
const GENERAL_TIPS: [&str; 3] = [
    "Practice with more mock interviews to build experience",
    "Research the company and role to provide more targeted answers",
    "Prepare questions to ask the interviewer to show engagement",
];

pub struct ReportGeneration<'a> {
    pub session: &'a Session,
    pub averages: ScoreAverages,
}

#[async_trait]
impl TieredTask for ReportGeneration<'_> {
    type Output = Report;

    fn name(&self) -> &'static str {
        "report"
    }

    async fn remote(&self, llm: &LlmClient) -> Option<Report> {
        if !llm.is_available() {
            return None;
        }
        let lines: Vec<ReportLine<'_>> = self
            .session
            .graded()
            .map(|(question, answer, evaluation)| ReportLine {
                id: &answer.question_id,
                question: question.map(|q| q.text.as_str()).unwrap_or_default(),
                technical: evaluation.technical,
                communication: evaluation.communication,
                confidence: evaluation.confidence,
                notes: &evaluation.short_notes,
            })
            .collect();
        let request =
            prompts::final_report(&lines, &self.averages).into_request(TEMPERATURE, MAX_TOKENS);
        let text = llm.complete(&request).await;
        parse_report(&text, local_report(self.session, &self.averages))
    }

    fn local(&self) -> Option<Report> {
        Some(local_report(self.session, &self.averages))
    }

    fn fallback(&self) -> Report {
        static_report(&self.averages)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Remote merge
// ────────────────────────────────────────────────────────────────────────────

/// Merges an LLM report over `base`. Only non-objects and objects with no
/// report field at all are rejected.
pub fn parse_report(text: &str, base: Report) -> Option<Report> {
    let Value::Object(obj) = extract_json(text)? else {
        return None;
    };
    if !REPORT_KEYS.iter().any(|k| obj.contains_key(*k)) {
        return None;
    }

    let score = |key: &str, default: u8| {
        coerce::integer_field(&obj, key)
            .map(clamp_score)
            .unwrap_or(default)
    };

    Some(Report {
        overall_summary: coerce::text(&obj, &["overall_summary"]).unwrap_or(base.overall_summary),
        technical_strengths: coerce::list_field(&obj, "technical_strengths")
            .unwrap_or(base.technical_strengths),
        technical_gaps: coerce::list_field(&obj, "technical_gaps").unwrap_or(base.technical_gaps),
        communication_score: score("communication_score", base.communication_score),
        behavioral_score: score("behavioral_score", base.behavioral_score),
        improved_answers: improved_answers(&obj).unwrap_or(base.improved_answers),
        recommendations: coerce::list_field(&obj, "recommendations")
            .unwrap_or(base.recommendations),
    })
}

fn improved_answers(obj: &Object) -> Option<Vec<ImprovedAnswer>> {
    let Value::Array(items) = obj.get("improved_answers")? else {
        return None;
    };
    Some(
        items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|item| {
                Some(ImprovedAnswer {
                    id: coerce::text(item, &["id"])?,
                    improved: coerce::text(item, &["improved", "answer"])?,
                })
            })
            .collect(),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Local and static reports
// ────────────────────────────────────────────────────────────────────────────

/// Report for a session with no graded answers.
pub fn empty_report() -> Report {
    Report {
        overall_summary: "No evaluations available.".to_string(),
        technical_strengths: Vec::new(),
        technical_gaps: Vec::new(),
        communication_score: 0,
        behavioral_score: 0,
        improved_answers: Vec::new(),
        recommendations: Vec::new(),
    }
}

pub fn performance_summary(confidence: f64, communication: f64) -> &'static str {
    if confidence >= 80.0 && communication >= 80.0 {
        "Excellent performance with strong technical knowledge and communication skills."
    } else if confidence >= 70.0 && communication >= 70.0 {
        "Good overall performance with solid fundamentals."
    } else if confidence >= 60.0 || communication >= 60.0 {
        "Adequate performance with some areas needing improvement."
    } else {
        "Needs significant improvement in both technical and communication areas."
    }
}

/// Up to five suggestions for every average under 70, padded with general advice.
pub fn recommendations(averages: &ScoreAverages) -> Vec<String> {
    let mut tips: Vec<&str> = Vec::new();
    if averages.avg_technical < 70.0 {
        tips.extend(TECHNICAL_TIPS);
    }
    if averages.avg_communication < 70.0 {
        tips.extend(COMMUNICATION_TIPS);
    }
    if averages.avg_confidence < 70.0 {
        tips.extend(CONFIDENCE_TIPS);
    }
    if tips.len() < 3 {
        tips.extend(GENERAL_TIPS);
    }
    tips.into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(str::to_string)
        .collect()
}

pub fn local_report(session: &Session, averages: &ScoreAverages) -> Report {
    let graded: Vec<_> = session.graded().collect();

    let highlight = |label: &str, keep: fn(u8) -> bool| -> Vec<String> {
        graded
            .iter()
            .filter(|(_, _, e)| keep(e.technical))
            .filter_map(|(q, _, _)| *q)
            .take(MAX_HIGHLIGHTS)
            .map(|q| format!("{label}: {}", truncate_chars(&q.text, HIGHLIGHT_CHARS)))
            .collect()
    };

    let mut technical_strengths = highlight("Strong answer", |t| t >= 80);
    if technical_strengths.is_empty() && averages.avg_technical >= 70.0 {
        technical_strengths.push("Good technical knowledge demonstrated".to_string());
    }
    let mut technical_gaps = highlight("Needs more depth", |t| t < 60);
    if technical_gaps.is_empty() && averages.avg_technical < 70.0 {
        technical_gaps.push("Continue practicing technical concepts".to_string());
    }

    let improved_answers = graded
        .iter()
        .filter_map(|(_, answer, _)| {
            local_improvement(&answer.transcript).map(|improved| ImprovedAnswer {
                id: answer.question_id.clone(),
                improved,
            })
        })
        .collect();

    Report {
        overall_summary: format!(
            "Completed {} of {} questions with average scores: Technical {:.1}, \
             Communication {:.1}, Confidence {:.1}. {}",
            graded.len(),
            session.questions.len(),
            averages.avg_technical,
            averages.avg_communication,
            averages.avg_confidence,
            performance_summary(averages.avg_confidence, averages.avg_communication)
        ),
        technical_strengths,
        technical_gaps,
        communication_score: averages.communication_score(),
        behavioral_score: averages.behavioral_score(),
        improved_answers,
        recommendations: recommendations(averages),
    }
}

pub fn static_report(averages: &ScoreAverages) -> Report {
    Report {
        overall_summary: format!(
            "Interview completed. Average technical: {:.1}, communication: {:.1}.",
            averages.avg_technical, averages.avg_communication
        ),
        technical_strengths: Vec::new(),
        technical_gaps: Vec::new(),
        communication_score: averages.communication_score(),
        behavioral_score: averages.behavioral_score(),
        improved_answers: Vec::new(),
        recommendations: vec![
            "Practice more interview questions".to_string(),
            "Focus on clear communication".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::fallback::{resolve, Tier};
    use crate::interview::models::{
        Answer, BehavioralMetrics, CandidateProfile, Evaluation, Experience, InterviewType, Persona,
    };
    use crate::interview::question_gen::static_questions;
    use crate::interview::scoring::aggregate;
    use crate::llm_client::test_support::{client_for, completion_body, offline_client};

    fn graded_session(scores: &[(u8, u8, u8)]) -> Session {
        let mut session = Session::new(
            CandidateProfile::new("Backend Developer", vec![], Experience::default()),
            Persona::Neutral,
            InterviewType::Mixed,
            static_questions(InterviewType::Mixed),
        );
        for (i, &(t, c, f)) in scores.iter().enumerate() {
            session.record(
                Answer {
                    question_id: format!("q{}", i + 1),
                    transcript: format!("Answer number {}. With detail.", i + 1),
                    metrics: BehavioralMetrics::default(),
                },
                Evaluation::bounded(t.into(), c.into(), f.into(), 70, "ok"),
            );
        }
        session
    }

    #[test]
    fn test_performance_summary_bands() {
        assert!(performance_summary(85.0, 90.0).starts_with("Excellent"));
        assert!(performance_summary(75.0, 70.0).starts_with("Good"));
        assert!(performance_summary(50.0, 65.0).starts_with("Adequate"));
        assert!(performance_summary(50.0, 50.0).starts_with("Needs"));
    }

    #[test]
    fn test_recommendations_capped_at_five() {
        let recs = recommendations(&ScoreAverages::default());
        assert_eq!(recs.len(), 5);
        assert_eq!(recs[0], TECHNICAL_TIPS[0]);
        assert_eq!(recs[3], COMMUNICATION_TIPS[0]);
    }

    #[test]
    fn test_recommendations_padded_with_general_advice() {
        let averages = ScoreAverages {
            avg_technical: 90.0,
            avg_communication: 90.0,
            avg_confidence: 90.0,
            avg_relevance: 90.0,
        };
        assert_eq!(recommendations(&averages), GENERAL_TIPS.map(str::to_string).to_vec());
    }

    #[test]
    fn test_local_report_strengths_and_gaps() {
        let session = graded_session(&[(90, 80, 80), (40, 80, 80)]);
        let averages = aggregate(session.evaluations());
        let report = local_report(&session, &averages);

        assert_eq!(report.technical_strengths.len(), 1);
        assert!(report.technical_strengths[0].contains("Tell me about yourself"));
        assert_eq!(report.technical_gaps.len(), 1);
        assert_eq!(report.communication_score, 80);
        assert_eq!(report.behavioral_score, 80);
        assert_eq!(report.improved_answers.len(), 2);
        assert_eq!(report.improved_answers[1].id, "q2");
        assert!(report.overall_summary.starts_with("Completed 2 of 7 questions"));
    }

    #[test]
    fn test_parse_report_fills_missing_fields_from_base() {
        let session = graded_session(&[(80, 70, 60)]);
        let averages = aggregate(session.evaluations());
        let base = local_report(&session, &averages);

        let reply = r#"{
            "overall_summary": "Great session.",
            "communication_score": "88",
            "technical_gaps": "depth, breadth"
        }"#;
        let report = parse_report(reply, base.clone()).unwrap();

        assert_eq!(report.overall_summary, "Great session.");
        assert_eq!(report.communication_score, 88);
        assert_eq!(report.behavioral_score, base.behavioral_score);
        assert_eq!(report.technical_gaps, vec!["depth", "breadth"]);
        assert_eq!(report.recommendations, base.recommendations);
        assert_eq!(report.improved_answers, base.improved_answers);
    }

    #[test]
    fn test_parse_report_reads_improved_answers() {
        let report = parse_report(
            r#"{"improved_answers": [{"id": "q1", "improved": "Better."}, {"id": "q2"}, "junk"]}"#,
            static_report(&ScoreAverages::default()),
        )
        .unwrap();
        assert_eq!(
            report.improved_answers,
            vec![ImprovedAnswer {
                id: "q1".to_string(),
                improved: "Better.".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_report_clamps_scores() {
        let report = parse_report(r#"{"behavioral_score": 400}"#, empty_report()).unwrap();
        assert_eq!(report.behavioral_score, 100);
    }

    #[test]
    fn test_parse_report_rejects_unrelated_json() {
        assert!(parse_report(r#"{"foo": 1}"#, empty_report()).is_none());
        assert!(parse_report(r#"["a"]"#, empty_report()).is_none());
        assert!(parse_report("", empty_report()).is_none());
    }

    #[tokio::test]
    async fn test_offline_report_uses_local_tier() {
        let session = graded_session(&[(80, 60, 60)]);
        let task = ReportGeneration {
            session: &session,
            averages: aggregate(session.evaluations()),
        };
        let resolved = resolve(&task, &offline_client()).await;
        assert_eq!(resolved.tier, Tier::Local);
        assert_eq!(resolved.value.communication_score, 60);
    }

    #[tokio::test]
    async fn test_remote_report_merged_over_local() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(
                "```json\n{\"overall_summary\": \"Solid candidate.\", \
                 \"recommendations\": [\"Quantify impact\"]}\n```",
            ))
            .create_async()
            .await;

        let llm = client_for(Some("key"), format!("{}/chat/completions", server.url()));
        let session = graded_session(&[(80, 60, 60)]);
        let task = ReportGeneration {
            session: &session,
            averages: aggregate(session.evaluations()),
        };
        let resolved = resolve(&task, &llm).await;

        assert_eq!(resolved.tier, Tier::Remote);
        assert_eq!(resolved.value.overall_summary, "Solid candidate.");
        assert_eq!(resolved.value.recommendations, vec!["Quantify impact"]);
        assert_eq!(resolved.value.communication_score, 60);
        assert_eq!(resolved.value.improved_answers.len(), 1);
    }
}
