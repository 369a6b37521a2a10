//! Orchestration entry point. Every operation runs its task through the
//! fallback chain and reports the tier that produced the result.

use crate::interview::evaluation::AnswerEvaluation;
use crate::interview::fallback::{resolve, Resolved, Tier};
use crate::interview::improvement::AnswerImprovement;
use crate::interview::models::{
    Answer, CandidateProfile, Evaluation, InterviewType, Persona, Question, Report, Session,
};
use crate::interview::question_gen::QuestionGeneration;
use crate::interview::reply::InterviewerReply;
use crate::interview::report::{empty_report, ReportGeneration};
use crate::interview::scoring::{aggregate, ScoreAverages};
use crate::llm_client::LlmClient;

pub struct InterviewPipeline {
    llm: LlmClient,
}

impl InterviewPipeline {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    pub fn remote_enabled(&self) -> bool {
        self.llm.is_available()
    }

    pub async fn generate_questions(
        &self,
        profile: &CandidateProfile,
        persona: Persona,
        interview_type: InterviewType,
    ) -> Resolved<Vec<Question>> {
        let task = QuestionGeneration {
            profile,
            persona,
            interview_type,
        };
        resolve(&task, &self.llm).await
    }

    pub async fn evaluate_answer(
        &self,
        question: &Question,
        answer: &Answer,
        profile: &CandidateProfile,
    ) -> Resolved<Evaluation> {
        let task = AnswerEvaluation {
            question,
            answer,
            profile,
        };
        resolve(&task, &self.llm).await
    }

    pub async fn improve_answer(
        &self,
        question_text: &str,
        transcript: &str,
        role: &str,
    ) -> Resolved<String> {
        let task = AnswerImprovement {
            question_text,
            transcript,
            role,
        };
        resolve(&task, &self.llm).await
    }

    pub async fn interviewer_reply(
        &self,
        persona: Persona,
        question_text: &str,
        transcript: &str,
    ) -> Resolved<String> {
        let task = InterviewerReply {
            persona,
            question_text,
            transcript,
        };
        resolve(&task, &self.llm).await
    }

    /// Aggregates the session's evaluations and builds the report. A session
    /// with no evaluations gets the empty report without touching any tier.
    pub async fn generate_report(&self, session: &Session) -> (ScoreAverages, Resolved<Report>) {
        let averages = aggregate(session.evaluations());
        if session.evaluations().is_empty() {
            let report = Resolved {
                value: empty_report(),
                tier: Tier::Static,
            };
            return (averages, report);
        }

        let task = ReportGeneration { session, averages };
        (averages, resolve(&task, &self.llm).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::{BehavioralMetrics, Experience};
    use crate::llm_client::test_support::offline_client;

    fn pipeline() -> InterviewPipeline {
        InterviewPipeline::new(offline_client())
    }

    #[tokio::test]
    async fn test_empty_session_report_skips_tiers() {
        let session = Session::new(
            CandidateProfile::new("Dev", vec![], Experience::default()),
            Persona::Neutral,
            InterviewType::Mixed,
            vec![],
        );
        let (averages, report) = pipeline().generate_report(&session).await;
        assert_eq!(averages, ScoreAverages::default());
        assert_eq!(report.value.overall_summary, "No evaluations available.");
        assert_eq!(report.value.communication_score, 0);
    }

    #[tokio::test]
    async fn test_offline_session_end_to_end() {
        let pipeline = pipeline();
        assert!(!pipeline.remote_enabled());

        let profile = CandidateProfile::new(
            "Frontend Engineer",
            vec!["React".to_string()],
            Experience::default(),
        );
        let questions = pipeline
            .generate_questions(&profile, Persona::Warm, InterviewType::Mixed)
            .await
            .value;
        let mut session = Session::new(
            profile.clone(),
            Persona::Warm,
            InterviewType::Mixed,
            questions,
        );

        for question in session.questions.clone().iter().take(3) {
            let answer = Answer {
                question_id: question.id.clone(),
                transcript: "I rebuilt our rendering pipeline and improved load time by 30%."
                    .to_string(),
                metrics: BehavioralMetrics::default(),
            };
            let evaluation = pipeline.evaluate_answer(question, &answer, &profile).await;
            assert_eq!(evaluation.tier, Tier::Local);
            session.record(answer, evaluation.value);
        }

        let (averages, report) = pipeline.generate_report(&session).await;
        assert!(averages.avg_technical > 0.0);
        assert_eq!(report.tier, Tier::Local);
        assert_eq!(report.value.improved_answers.len(), 3);
    }
}
