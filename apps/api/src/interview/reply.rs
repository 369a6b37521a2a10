//! Interviewer reply: a short conversational acknowledgement after each answer.

use async_trait::async_trait;

use crate::interview::fallback::TieredTask;
use crate::interview::heuristics;
use crate::interview::models::{truncate_chars, Persona};
use crate::interview::prompts;
use crate::llm_client::extract::clean_plain_text;
use crate::llm_client::LlmClient;

const TEMPERATURE: f64 = 0.4;
const MAX_TOKENS: u32 = 80;

pub const MAX_REPLY_CHARS: usize = 240;

/// Answers under this many words get a request for more detail.
const SHORT_ANSWER_WORDS: usize = 15;

const STATIC_REPLY: &str = "Thank you for your answer. Let's continue with the next question.";

pub struct InterviewerReply<'a> {
    pub persona: Persona,
    pub question_text: &'a str,
    pub transcript: &'a str,
}

#[async_trait]
impl TieredTask for InterviewerReply<'_> {
    type Output = String;

    fn name(&self) -> &'static str {
        "interviewer_reply"
    }

    async fn remote(&self, llm: &LlmClient) -> Option<String> {
        if !llm.is_available() {
            return None;
        }
        let request = prompts::interviewer_reply(self.persona, self.question_text, self.transcript)
            .into_request(TEMPERATURE, MAX_TOKENS);
        clean_plain_text(&llm.complete(&request).await)
            .map(|reply| truncate_chars(&reply, MAX_REPLY_CHARS))
    }

    fn local(&self) -> Option<String> {
        Some(local_reply(self.persona, self.transcript).to_string())
    }

    fn fallback(&self) -> String {
        STATIC_REPLY.to_string()
    }
}

/// Canned reply picked from the answer's shape.
pub fn local_reply(persona: Persona, transcript: &str) -> &'static str {
    let words = heuristics::word_count(transcript);
    let star_complete = heuristics::star_coverage(transcript) >= 1.0;

    match (persona, words < SHORT_ANSWER_WORDS, star_complete) {
        (Persona::Strict, true, _) => {
            "That was brief. I need concrete details: what exactly did you do, and what was the \
             result?"
        }
        (_, true, _) => {
            "Thanks. Could you walk me through a specific example in a bit more detail?"
        }
        (Persona::Warm, _, true) => {
            "That's a great example, and I appreciate how clearly you described the outcome. \
             Let's move on."
        }
        (_, _, true) => {
            "Thank you, that was a well-structured answer with a clear outcome. Let's continue."
        }
        (Persona::Strict, _, _) => {
            "Noted. Next time, quantify the impact of your actions. Let's continue."
        }
        _ => STATIC_REPLY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::fallback::{resolve, Tier};
    use crate::llm_client::test_support::{client_for, completion_body, offline_client};

    const STAR_ANSWER: &str = "The situation was a failing nightly batch at my last company. \
        My task was to make it reliable before the quarter closed. I implemented retries and \
        idempotent writes across every stage. The result was zero missed runs for six months.";

    #[test]
    fn test_short_answer_asks_for_detail() {
        assert!(local_reply(Persona::Neutral, "I used Redis.").contains("specific example"));
        assert!(local_reply(Persona::Strict, "I used Redis.").starts_with("That was brief"));
    }

    #[test]
    fn test_star_answer_acknowledges_outcome() {
        assert!(local_reply(Persona::Neutral, STAR_ANSWER).contains("clear outcome"));
        assert!(local_reply(Persona::Warm, STAR_ANSWER).starts_with("That's a great example"));
    }

    #[test]
    fn test_replies_fit_length_cap() {
        for persona in [Persona::Neutral, Persona::Warm, Persona::Strict] {
            for transcript in ["", "short", STAR_ANSWER] {
                assert!(local_reply(persona, transcript).chars().count() <= MAX_REPLY_CHARS);
            }
        }
    }

    #[tokio::test]
    async fn test_offline_reply_is_local() {
        let task = InterviewerReply {
            persona: Persona::Neutral,
            question_text: "Q?",
            transcript: STAR_ANSWER,
        };
        let resolved = resolve(&task, &offline_client()).await;
        assert_eq!(resolved.tier, Tier::Local);
    }

    #[tokio::test]
    async fn test_remote_reply_is_capped() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(&"Interesting. ".repeat(40)))
            .create_async()
            .await;

        let llm = client_for(Some("key"), format!("{}/chat/completions", server.url()));
        let task = InterviewerReply {
            persona: Persona::Warm,
            question_text: "Q?",
            transcript: "A.",
        };
        let resolved = resolve(&task, &llm).await;
        assert_eq!(resolved.tier, Tier::Remote);
        assert_eq!(resolved.value.chars().count(), MAX_REPLY_CHARS);
    }

    #[tokio::test]
    async fn test_remote_reply_is_unquoted() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("  \"Good detail. Let's keep going.\"  "))
            .create_async()
            .await;

        let llm = client_for(Some("key"), format!("{}/chat/completions", server.url()));
        let task = InterviewerReply {
            persona: Persona::Neutral,
            question_text: "Q?",
            transcript: "A.",
        };
        let resolved = resolve(&task, &llm).await;
        assert_eq!(resolved.tier, Tier::Remote);
        assert_eq!(resolved.value, "Good detail. Let's keep going.");
    }
}
