use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::fallback::Tier;
use crate::interview::models::{
    Answer, BehavioralMetrics, CandidateProfile, Evaluation, InterviewType, Persona, Question,
    Report,
};
use crate::interview::scoring::ScoreAverages;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StartRequest {
    pub profile: CandidateProfile,
    #[serde(default)]
    pub persona: Persona,
    #[serde(default)]
    pub interview_type: InterviewType,
}

#[derive(Serialize)]
pub struct StartResponse {
    pub session_id: Uuid,
    pub persona: Persona,
    pub interview_type: InterviewType,
    pub questions: Vec<Question>,
    pub question_source: Tier,
}

/// POST /api/v1/interview/start
pub async fn handle_start(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> Result<Json<StartResponse>, AppError> {
    let generated = state
        .pipeline
        .generate_questions(&req.profile, req.persona, req.interview_type)
        .await;

    let session = state
        .sessions
        .create(req.profile, req.persona, req.interview_type, generated.value)?;
    info!(
        "Session {} started ({} questions from {:?} tier)",
        session.id,
        session.questions.len(),
        generated.tier
    );

    Ok(Json(StartResponse {
        session_id: session.id,
        persona: session.persona,
        interview_type: session.interview_type,
        questions: session.questions,
        question_source: generated.tier,
    }))
}

#[derive(Deserialize)]
pub struct SubmitAnswerRequest {
    pub session_id: Uuid,
    pub question_id: String,
    pub transcript: String,
    #[serde(default)]
    pub metrics: BehavioralMetrics,
}

#[derive(Serialize)]
pub struct SubmitAnswerResponse {
    pub question_id: String,
    pub evaluation: Evaluation,
    pub interviewer_reply: String,
    pub answered: usize,
    pub remaining: usize,
    pub evaluation_source: Tier,
    pub reply_source: Tier,
}

/// POST /api/v1/interview/submit-answer
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let session = state.sessions.get(req.session_id)?;
    let question = session.question(&req.question_id).cloned().ok_or_else(|| {
        AppError::NotFound(format!(
            "Question {} not found in session {}",
            req.question_id, req.session_id
        ))
    })?;
    if session.answer_for(&req.question_id).is_some() {
        return Err(AppError::Validation(format!(
            "Question {} has already been answered",
            req.question_id
        )));
    }

    let answer = Answer {
        question_id: req.question_id,
        transcript: req.transcript,
        metrics: req.metrics,
    };

    let evaluation = state
        .pipeline
        .evaluate_answer(&question, &answer, &session.profile)
        .await;
    let reply = state
        .pipeline
        .interviewer_reply(session.persona, &question.text, &answer.transcript)
        .await;

    let question_id = answer.question_id.clone();
    let updated = state
        .sessions
        .record_answer(req.session_id, answer, evaluation.value.clone())?;
    let answered = updated.answers().len();

    Ok(Json(SubmitAnswerResponse {
        question_id,
        evaluation: evaluation.value,
        interviewer_reply: reply.value,
        answered,
        remaining: updated.questions.len().saturating_sub(answered),
        evaluation_source: evaluation.tier,
        reply_source: reply.tier,
    }))
}

#[derive(Deserialize)]
pub struct ImproveAnswerRequest {
    pub session_id: Uuid,
    pub question_id: String,
}

#[derive(Serialize)]
pub struct ImproveAnswerResponse {
    pub question_id: String,
    pub improved_answer: String,
    pub source: Tier,
}

/// POST /api/v1/interview/improve-answer
pub async fn handle_improve_answer(
    State(state): State<AppState>,
    Json(req): Json<ImproveAnswerRequest>,
) -> Result<Json<ImproveAnswerResponse>, AppError> {
    let session = state.sessions.get(req.session_id)?;
    let question = session.question(&req.question_id).ok_or_else(|| {
        AppError::NotFound(format!(
            "Question {} not found in session {}",
            req.question_id, req.session_id
        ))
    })?;
    let answer = session.answer_for(&req.question_id).ok_or_else(|| {
        AppError::NotFound(format!("No answer recorded for question {}", req.question_id))
    })?;

    let improved = state
        .pipeline
        .improve_answer(&question.text, &answer.transcript, session.profile.role_or_default())
        .await;

    Ok(Json(ImproveAnswerResponse {
        question_id: req.question_id,
        improved_answer: improved.value,
        source: improved.tier,
    }))
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub session_id: Uuid,
    pub averages: ScoreAverages,
    pub report: Report,
    pub source: Tier,
}

/// GET /api/v1/interview/:session_id/report
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ReportResponse>, AppError> {
    let session = state.sessions.get(session_id)?;
    let (averages, report) = state.pipeline.generate_report(&session).await;

    Ok(Json(ReportResponse {
        session_id,
        averages,
        report: report.value,
        source: report.tier,
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::state::test_state;

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => request
                .header("content-type", "application/json")
                .body(Body::from(b.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn start(app: &Router) -> Value {
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/interview/start",
            Some(json!({
                "profile": {
                    "role": "Backend Developer",
                    "skills": ["Python", "SQL"],
                    "experience": {"years": 4, "level": "Mid-Level"}
                },
                "interview_type": "technical"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_start_returns_seven_local_questions() {
        let app = build_router(test_state());
        let body = start(&app).await;

        assert_eq!(body["question_source"], "local");
        assert_eq!(body["persona"], "neutral");
        let questions = body["questions"].as_array().unwrap();
        assert_eq!(questions.len(), 7);
        assert_eq!(questions[0]["id"], "q1");
        assert_eq!(questions[0]["type"], "technical");
    }

    #[tokio::test]
    async fn test_submit_answer_then_report() {
        let app = build_router(test_state());
        let started = start(&app).await;
        let session_id = started["session_id"].as_str().unwrap().to_string();

        let (status, submitted) = send(
            &app,
            "POST",
            "/api/v1/interview/submit-answer",
            Some(json!({
                "session_id": session_id,
                "question_id": "q1",
                "transcript": "I have four years of backend experience building Python services.",
                "metrics": {"filler_words": 2}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(submitted["evaluation_source"], "local");
        assert_eq!(submitted["answered"], 1);
        assert_eq!(submitted["remaining"], 6);
        assert!(submitted["evaluation"]["technical"].as_u64().unwrap() <= 100);
        assert!(!submitted["interviewer_reply"].as_str().unwrap().is_empty());

        let report_uri = format!("/api/v1/interview/{session_id}/report");
        let (status, report) = send(&app, "GET", &report_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["source"], "local");
        assert_eq!(report["report"]["improved_answers"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_answer_is_rejected() {
        let app = build_router(test_state());
        let started = start(&app).await;
        let payload = json!({
            "session_id": started["session_id"],
            "question_id": "q2",
            "transcript": "An answer."
        });

        let uri = "/api/v1/interview/submit-answer";
        let (first, _) = send(&app, "POST", uri, Some(payload.clone())).await;
        let (second, body) = send(&app, "POST", uri, Some(payload)).await;
        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_blank_transcript_scores_as_unanswered() {
        let app = build_router(test_state());
        let started = start(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/interview/submit-answer",
            Some(json!({
                "session_id": started["session_id"],
                "question_id": "q1",
                "transcript": "  "
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["evaluation_source"], "local");
        assert_eq!(body["evaluation"]["short_notes"], "No answer provided.");
        assert_eq!(body["evaluation"]["technical"], 50);
        assert_eq!(body["evaluation"]["communication"], 70);
        assert_eq!(body["evaluation"]["confidence"], 70);
        assert_eq!(body["evaluation"]["relevance"], 50);
        assert_eq!(body["answered"], 1);
    }

    #[tokio::test]
    async fn test_unknown_session_and_question_are_not_found() {
        let app = build_router(test_state());
        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/v1/interview/{}/report", uuid::Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let started = start(&app).await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/interview/submit-answer",
            Some(json!({
                "session_id": started["session_id"],
                "question_id": "q42",
                "transcript": "Hi."
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_improve_answer_requires_recorded_answer() {
        let app = build_router(test_state());
        let started = start(&app).await;
        let improve = json!({"session_id": started["session_id"], "question_id": "q3"});

        let improve_uri = "/api/v1/interview/improve-answer";
        let (status, _) = send(&app, "POST", improve_uri, Some(improve.clone())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        send(
            &app,
            "POST",
            "/api/v1/interview/submit-answer",
            Some(json!({
                "session_id": started["session_id"],
                "question_id": "q3",
                "transcript": "We split the monolith into three services. Deploys got faster."
            })),
        )
        .await;

        let (status, body) = send(&app, "POST", improve_uri, Some(improve)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "local");
        assert!(body["improved_answer"]
            .as_str()
            .unwrap()
            .starts_with("We split the monolith into three services."));
    }

    #[tokio::test]
    async fn test_report_without_answers_is_empty() {
        let app = build_router(test_state());
        let started = start(&app).await;
        let session_id = started["session_id"].as_str().unwrap();
        let report_uri = format!("/api/v1/interview/{session_id}/report");
        let (status, body) = send(&app, "GET", &report_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["overall_summary"], "No evaluations available.");
        assert_eq!(body["averages"]["avg_technical"], 0.0);
    }
}
