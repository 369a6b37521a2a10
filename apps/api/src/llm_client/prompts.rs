// Shared prompt fragments.
// Each task defines its own prompts alongside it (interview::prompts).
// This file contains the cross-cutting output-format rules.

/// Appended to every system prompt whose task expects structured output.
pub const JSON_ONLY_RULES: &str = "Return ONLY valid JSON. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences.";

/// Appended to every system prompt whose task expects prose.
pub const PLAIN_TEXT_RULES: &str = "Return ONLY the text itself. \
    No JSON, no quotes, no preamble.";
