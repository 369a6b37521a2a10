//! Answer improvement: a short rewritten answer as plain text.

use async_trait::async_trait;

use crate::interview::fallback::TieredTask;
use crate::interview::models::truncate_chars;
use crate::interview::prompts;
use crate::llm_client::extract::clean_plain_text;
use crate::llm_client::LlmClient;

const TEMPERATURE: f64 = 0.3;
const MAX_TOKENS: u32 = 150;

/// Hard cap on improved answer length, in characters.
pub const MAX_IMPROVED_CHARS: usize = 300;

/// Characters of the original answer kept in the local rewrite.
const LOCAL_CORE_CHARS: usize = 160;

pub struct AnswerImprovement<'a> {
    pub question_text: &'a str,
    pub transcript: &'a str,
    pub role: &'a str,
}

#[async_trait]
impl TieredTask for AnswerImprovement<'_> {
    type Output = String;

    fn name(&self) -> &'static str {
        "improvement"
    }

    async fn remote(&self, llm: &LlmClient) -> Option<String> {
        if !llm.is_available() {
            return None;
        }
        let request = prompts::improvement(self.question_text, self.transcript, self.role)
            .into_request(TEMPERATURE, MAX_TOKENS);
        clean_plain_text(&llm.complete(&request).await)
            .map(|improved| truncate_chars(&improved, MAX_IMPROVED_CHARS))
    }

    fn local(&self) -> Option<String> {
        local_improvement(self.transcript)
    }

    fn fallback(&self) -> String {
        truncate_chars(
            &format!(
                "Consider providing more specific examples and metrics in your answer. \
                 Original answer: {}",
                self.transcript.trim()
            ),
            MAX_IMPROVED_CHARS,
        )
    }
}

/// Keeps the candidate's opening sentence and frames it with a situation,
/// action and measurable result. `None` for a blank answer.
pub fn local_improvement(transcript: &str) -> Option<String> {
    let transcript = transcript.trim();
    if transcript.is_empty() {
        return None;
    }

    let core = truncate_chars(first_sentence(transcript), LOCAL_CORE_CHARS);

    Some(truncate_chars(
        &format!(
            "{core}. To make this concrete, I would describe the situation, the specific actions \
             I took, and a measurable result such as time saved or errors reduced."
        ),
        MAX_IMPROVED_CHARS,
    ))
}

/// Text before the first `.`, `!` or `?` that ends a sentence, i.e. one
/// followed by whitespace or the end of the text. "2.5" and "v1.2" stay whole.
fn first_sentence(text: &str) -> &str {
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
        if matches!(c, '.' | '!' | '?') && at_boundary {
            return text[..i].trim();
        }
    }
    text.trim()
}
