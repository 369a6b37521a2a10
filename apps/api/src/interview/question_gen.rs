//! Question generation: exactly seven questions per session.
//!
//! Remote: prompt → LLM → extract → validate (≥7 objects, truncate to 7, backfill).
//! Local: role question bank + persona-prefixed templates.
//! Static: seven generic questions.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::interview::coerce::{self, Object};
use crate::interview::fallback::TieredTask;
use crate::interview::models::{
    CandidateProfile, Difficulty, ExpectedLength, InterviewType, Persona, Question,
    QUESTIONS_PER_SESSION,
};
use crate::interview::models::Difficulty::{Easy, Hard, Medium};
use crate::interview::models::ExpectedLength::{Long, Medium as MediumLength};
use crate::interview::models::InterviewType::{Behavioral, Technical};
use crate::interview::prompts;
use crate::llm_client::extract::extract_json;
use crate::llm_client::LlmClient;

const TEMPERATURE: f64 = 0.0;
const MAX_TOKENS: u32 = 600;

pub struct QuestionGeneration<'a> {
    pub profile: &'a CandidateProfile,
    pub persona: Persona,
    pub interview_type: InterviewType,
}

#[async_trait]
impl TieredTask for QuestionGeneration<'_> {
    type Output = Vec<Question>;

    fn name(&self) -> &'static str {
        "question_generation"
    }

    async fn remote(&self, llm: &LlmClient) -> Option<Vec<Question>> {
        if !llm.is_available() {
            return None;
        }
        let request = prompts::question_generation(self.profile, self.persona, self.interview_type)
            .into_request(TEMPERATURE, MAX_TOKENS);
        let text = llm.complete(&request).await;
        parse_questions(&text, self.interview_type)
    }

    fn local(&self) -> Option<Vec<Question>> {
        Some(local_questions(self.profile, self.persona, self.interview_type))
    }

    fn fallback(&self) -> Vec<Question> {
        static_questions(self.interview_type)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Remote validation
// ────────────────────────────────────────────────────────────────────────────

/// Validates an LLM reply into exactly seven questions, or `None` to fall through.
pub fn parse_questions(text: &str, interview_type: InterviewType) -> Option<Vec<Question>> {
    let Value::Array(items) = extract_json(text)? else {
        debug!("Question reply is not a JSON array");
        return None;
    };
    if items.len() < QUESTIONS_PER_SESSION {
        debug!("Question reply has {} items, need {}", items.len(), QUESTIONS_PER_SESSION);
        return None;
    }

    let mut questions = items
        .iter()
        .take(QUESTIONS_PER_SESSION)
        .enumerate()
        .map(|(i, item)| {
            item.as_object()
                .and_then(|obj| normalize_question(obj, i, interview_type))
        })
        .collect::<Option<Vec<_>>>()?;

    let mut seen = HashSet::new();
    if !questions.iter().all(|q| seen.insert(q.id.clone())) {
        for (i, q) in questions.iter_mut().enumerate() {
            q.id = format!("q{}", i + 1);
        }
    }

    Some(questions)
}

/// Backfills every absent field. A question without any text is unusable.
fn normalize_question(
    obj: &Object,
    index: usize,
    interview_type: InterviewType,
) -> Option<Question> {
    let text = coerce::text(obj, &["text", "question"])?;

    let id = match obj.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => format!("q{n}"),
        _ => format!("q{}", index + 1),
    };

    let str_field = |key: &str| obj.get(key).and_then(Value::as_str);

    Some(Question {
        id,
        text,
        followups: coerce::text(obj, &["followups", "followup", "follow_up"]).unwrap_or_default(),
        question_type: str_field("type")
            .and_then(InterviewType::parse_loose)
            .unwrap_or(interview_type),
        difficulty: str_field("difficulty")
            .and_then(Difficulty::parse_loose)
            .unwrap_or_default(),
        expected_keywords: coerce::list_field(obj, "expected_keywords").unwrap_or_default(),
        expected_length: str_field("expected_length")
            .and_then(ExpectedLength::parse_loose)
            .unwrap_or_default(),
        ideal_answer: coerce::text(obj, &["ideal_answer"]),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Local templates
// ────────────────────────────────────────────────────────────────────────────

struct Template {
    text: &'static str,
    followups: &'static str,
    /// `None` takes the requested interview type.
    question_type: Option<InterviewType>,
    difficulty: Difficulty,
    keywords: &'static [&'static str],
    length: ExpectedLength,
}

impl Template {
    fn build(
        &self,
        id: usize,
        role: &str,
        prefix: &str,
        interview_type: InterviewType,
    ) -> Question {
        let body = self.text.replace("{role}", role);
        let text = if prefix.is_empty() {
            body
        } else {
            format!("{prefix}{}", lowercase_first(&body))
        };
        Question {
            id: format!("q{id}"),
            text,
            followups: self.followups.to_string(),
            question_type: self.question_type.unwrap_or(interview_type),
            difficulty: self.difficulty,
            expected_keywords: self.keywords.iter().map(|k| k.to_string()).collect(),
            expected_length: self.length,
            ideal_answer: None,
        }
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

const fn template(
    text: &'static str,
    followups: &'static str,
    question_type: Option<InterviewType>,
    difficulty: Difficulty,
    keywords: &'static [&'static str],
    length: ExpectedLength,
) -> Template {
    Template {
        text,
        followups,
        question_type,
        difficulty,
        keywords,
        length,
    }
}

static GENERAL: [Template; QUESTIONS_PER_SESSION] = [
    template(
        "Tell me about yourself and your background.",
        "Can you elaborate?",
        None,
        Easy,
        &["experience", "background", "skills"],
        MediumLength,
    ),
    template(
        "Describe a challenging project you worked on as a {role}.",
        "What was the outcome?",
        None,
        Medium,
        &["project", "challenge", "solution", "technologies"],
        Long,
    ),
    template(
        "How do you handle tight deadlines and pressure?",
        "Give an example.",
        Some(Behavioral),
        Medium,
        &["time management", "stress", "prioritization"],
        MediumLength,
    ),
    template(
        "What technical skills do you bring to this {role} position?",
        "Which is your strongest?",
        None,
        Medium,
        &["skills", "technologies", "expertise"],
        MediumLength,
    ),
    template(
        "Describe a time when you had to learn a new technology quickly.",
        "How did you approach it?",
        Some(Behavioral),
        Medium,
        &["learning", "adaptation", "technology"],
        MediumLength,
    ),
    template(
        "How do you approach problem-solving in your work?",
        "Walk me through an example.",
        None,
        Hard,
        &["problem-solving", "methodology", "analysis"],
        Long,
    ),
    template(
        "Why are you interested in this {role} position?",
        "What excites you most?",
        Some(Behavioral),
        Easy,
        &["interest", "motivation", "goals"],
        MediumLength,
    ),
];

/// Role-specific prompts: two technical, one behavioral.
struct RoleBank {
    technical: [Template; 2],
    behavioral: Template,
}

static SOFTWARE: RoleBank = RoleBank {
    technical: [
        template(
            "What is the difference between synchronous and asynchronous programming?",
            "When would you choose each?",
            Some(Technical),
            Medium,
            &["blocking", "concurrency", "event loop", "threads"],
            MediumLength,
        ),
        template(
            "How would you optimize a slow database query?",
            "How would you verify the fix?",
            Some(Technical),
            Hard,
            &["index", "query plan", "profiling", "caching"],
            Long,
        ),
    ],
    behavioral: template(
        "How do you handle disagreements with team members?",
        "What was the result?",
        Some(Behavioral),
        Medium,
        &["communication", "compromise", "feedback"],
        MediumLength,
    ),
};

static FRONTEND: RoleBank = RoleBank {
    technical: [
        template(
            "How does the virtual DOM work in React?",
            "What are its trade-offs?",
            Some(Technical),
            Medium,
            &["diffing", "reconciliation", "rendering"],
            MediumLength,
        ),
        template(
            "How do you optimize web performance?",
            "Which metric do you watch first?",
            Some(Technical),
            Hard,
            &["bundle size", "lazy loading", "caching", "core web vitals"],
            Long,
        ),
    ],
    behavioral: template(
        "Tell me about a UI/UX challenge you faced and how you solved it.",
        "What did users say?",
        Some(Behavioral),
        Medium,
        &["user", "design", "feedback", "iteration"],
        MediumLength,
    ),
};

static BACKEND: RoleBank = RoleBank {
    technical: [
        template(
            "Explain the difference between monolithic and microservices architecture.",
            "When would you pick each?",
            Some(Technical),
            Medium,
            &["deployment", "scaling", "coupling", "services"],
            MediumLength,
        ),
        template(
            "Explain the concept of caching and its benefits.",
            "How do you handle invalidation?",
            Some(Technical),
            Hard,
            &["cache", "latency", "invalidation", "ttl"],
            Long,
        ),
    ],
    behavioral: template(
        "Tell me about a time you optimized application performance.",
        "How did you measure it?",
        Some(Behavioral),
        Medium,
        &["profiling", "bottleneck", "metrics", "result"],
        MediumLength,
    ),
};

static DATA: RoleBank = RoleBank {
    technical: [
        template(
            "Explain the bias-variance tradeoff in machine learning.",
            "How do you detect overfitting?",
            Some(Technical),
            Medium,
            &["bias", "variance", "overfitting", "regularization"],
            MediumLength,
        ),
        template(
            "How would you handle missing values in a dataset?",
            "When is dropping rows acceptable?",
            Some(Technical),
            Hard,
            &["imputation", "distribution", "missing"],
            Long,
        ),
    ],
    behavioral: template(
        "How do you communicate technical findings to non-technical stakeholders?",
        "Give an example.",
        Some(Behavioral),
        Medium,
        &["visualization", "audience", "clarity"],
        MediumLength,
    ),
};

static ML: RoleBank = RoleBank {
    technical: [
        template(
            "How do you deploy machine learning models to production?",
            "How do you roll back a bad model?",
            Some(Technical),
            Medium,
            &["serving", "monitoring", "versioning", "pipeline"],
            MediumLength,
        ),
        template(
            "How do you handle model drift in production?",
            "What triggers retraining?",
            Some(Technical),
            Hard,
            &["drift", "monitoring", "retraining", "metrics"],
            Long,
        ),
    ],
    behavioral: template(
        "Tell me about a time you had to explain an ML concept to a non-technical person.",
        "How did you check understanding?",
        Some(Behavioral),
        Medium,
        &["analogy", "audience", "clarity"],
        MediumLength,
    ),
};

static PRODUCT: RoleBank = RoleBank {
    technical: [
        template(
            "How do you prioritize features in a product roadmap?",
            "Which framework do you use?",
            Some(Technical),
            Medium,
            &["impact", "effort", "prioritization", "customers"],
            MediumLength,
        ),
        template(
            "What metrics do you use to measure product success?",
            "How do you pick a north-star metric?",
            Some(Technical),
            Hard,
            &["retention", "engagement", "conversion", "metrics"],
            Long,
        ),
    ],
    behavioral: template(
        "How do you handle conflicting priorities from different stakeholders?",
        "What was the outcome?",
        Some(Behavioral),
        Medium,
        &["stakeholders", "negotiation", "alignment"],
        MediumLength,
    ),
};

fn role_bank(role: &str) -> Option<&'static RoleBank> {
    let role = role.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| role.contains(n));

    if has(&["frontend", "front-end", "front end", "ui engineer"]) {
        Some(&FRONTEND)
    } else if has(&["backend", "back-end", "back end", "api"]) {
        Some(&BACKEND)
    } else if has(&["machine learning", "ml engineer", "ml ", "ai engineer"]) {
        Some(&ML)
    } else if has(&["data scien", "data analyst", "analytics"]) {
        Some(&DATA)
    } else if has(&["product manager", "product owner"]) {
        Some(&PRODUCT)
    } else if has(&["software", "developer", "engineer", "programmer"]) {
        Some(&SOFTWARE)
    } else {
        None
    }
}

/// Seven deterministic questions tailored by role bank, top skill and persona.
pub fn local_questions(
    profile: &CandidateProfile,
    persona: Persona,
    interview_type: InterviewType,
) -> Vec<Question> {
    let role = profile.role_or_default();
    let prefix = persona.question_prefix();
    let bank = role_bank(role);

    let slots: [&Template; QUESTIONS_PER_SESSION] = match bank {
        Some(b) => [
            &GENERAL[0],
            &GENERAL[1],
            &b.technical[0],
            &GENERAL[2],
            &b.technical[1],
            &b.behavioral,
            &GENERAL[6],
        ],
        None => [
            &GENERAL[0],
            &GENERAL[1],
            &GENERAL[3],
            &GENERAL[2],
            &GENERAL[5],
            &GENERAL[4],
            &GENERAL[6],
        ],
    };

    let mut questions: Vec<Question> = slots
        .iter()
        .enumerate()
        .map(|(i, t)| t.build(i + 1, role, prefix, interview_type))
        .collect();

    // Without a role bank, make slot 3 about the candidate's strongest listed skill.
    if bank.is_none() {
        if let Some(skill) = profile.skills.first() {
            let slot = &mut questions[2];
            let body = format!("How have you used {skill} in a recent project?");
            slot.text = if prefix.is_empty() {
                body
            } else {
                format!("{prefix}{}", lowercase_first(&body))
            };
            slot.followups = "What would you do differently?".to_string();
            slot.expected_keywords = vec![
                skill.to_lowercase(),
                "project".to_string(),
                "trade-off".to_string(),
            ];
        }
    }

    questions
}

/// Generic seven questions with no role, skill or persona tailoring.
pub fn static_questions(interview_type: InterviewType) -> Vec<Question> {
    GENERAL
        .iter()
        .enumerate()
        .map(|(i, t)| t.build(i + 1, "role", "", interview_type))
        .map(|mut q| {
            q.text = q
                .text
                .replace(" as a role", "")
                .replace(" this role position", " this position");
            q
        })
        .collect()
}
