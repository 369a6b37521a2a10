//! In-memory session store, keyed by session id. Process lifetime only.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::{
    Answer, CandidateProfile, Evaluation, InterviewType, Persona, Question, Session,
};

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Session>>, AppError> {
        self.sessions
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("session store lock poisoned")))
    }

    pub fn create(
        &self,
        profile: CandidateProfile,
        persona: Persona,
        interview_type: InterviewType,
        questions: Vec<Question>,
    ) -> Result<Session, AppError> {
        let session = Session::new(profile, persona, interview_type, questions);
        self.lock()?.insert(session.id, session.clone());
        Ok(session)
    }

    /// Snapshot of the session.
    pub fn get(&self, id: Uuid) -> Result<Session, AppError> {
        self.lock()?
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    /// Appends the answer and its evaluation together. The duplicate check is
    /// repeated under the lock because evaluation runs between `get` and here.
    pub fn record_answer(
        &self,
        id: Uuid,
        answer: Answer,
        evaluation: Evaluation,
    ) -> Result<Session, AppError> {
        let mut sessions = self.lock()?;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;

        if session.question(&answer.question_id).is_none() {
            return Err(AppError::NotFound(format!(
                "Question {} not found in session {id}",
                answer.question_id
            )));
        }
        if session.answer_for(&answer.question_id).is_some() {
            return Err(AppError::Validation(format!(
                "Question {} has already been answered",
                answer.question_id
            )));
        }

        session.record(answer, evaluation);
        Ok(session.clone())
    }
}
