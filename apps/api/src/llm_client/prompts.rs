// Shared prompt constants and prompt-building utilities.
// Feature-specific templates live next to the feature (analysis/prompts.rs,
// assessment/prompts.rs). This file contains the cross-cutting ones.

use chrono::Utc;
use uuid::Uuid;

/// Fragment appended to every prompt that expects structured output.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Translate-to-English pre-pass. Replace `{text}` before sending.
pub const TRANSLATE_TO_ENGLISH_TEMPLATE: &str =
    "Translate to English if needed. Return content as is if already English:\n{text}";

/// Localization post-pass. Replace `{language}` and `{content}` before sending.
pub const LOCALIZE_JSON_TEMPLATE: &str = "Translate the following JSON content to {language}. \
    Preserve the JSON structure EXACTLY. Only translate string values, never keys. \
    Do not translate the values of \"id\", \"type\", \"readinessLevel\" or \"learningUrl\", \
    and leave numbers untouched.\n\n{content}";

/// A value unique to this request, injected into prompts so that identical
/// inputs do not produce identical generations.
pub fn request_seed() -> String {
    format!("{}-{}", Uuid::new_v4(), Utc::now().timestamp_millis())
}

pub fn translate_to_english_prompt(text: &str) -> String {
    TRANSLATE_TO_ENGLISH_TEMPLATE.replace("{text}", text)
}

pub fn localize_json_prompt(content: &str, language: &str) -> String {
    LOCALIZE_JSON_TEMPLATE
        .replace("{language}", language)
        .replace("{content}", content)
}
