//! Assessment generation: one model call producing MCQ and CODING questions
//! for the requested skills.

use thiserror::Error;
use tracing::{info, warn};

use crate::assessment::prompts::assessment_prompt;
use crate::language::ResponseLanguage;
use crate::llm_client::prompts::request_seed;
use crate::llm_client::{strip_json_fences, LanguageModel, LlmError};
use crate::models::assessment::AssessmentResponse;

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("No skills supplied")]
    NoSkills,

    #[error("Model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("Model returned an undecodable assessment: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Blank entries are dropped and duplicates removed, keeping first occurrence.
pub fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for skill in skills {
        let skill = skill.trim();
        if !skill.is_empty() && !normalized.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
            normalized.push(skill.to_string());
        }
    }
    normalized
}

pub async fn generate_assessment(
    llm: &dyn LanguageModel,
    api_key: &str,
    skills: &[String],
    language: &ResponseLanguage,
) -> Result<AssessmentResponse, AssessmentError> {
    let skills = normalize_skills(skills);
    if skills.is_empty() {
        return Err(AssessmentError::NoSkills);
    }

    let prompt = assessment_prompt(&skills, language.display_name(), &request_seed());
    let raw = llm.generate(&prompt, api_key).await?;

    let response: AssessmentResponse =
        serde_json::from_str(strip_json_fences(&raw)).map_err(|e| {
            warn!("Assessment response did not decode: {e}");
            AssessmentError::Decode(e)
        })?;

    info!(
        "Generated {} assessment questions for {} skills",
        response.questions.len(),
        skills.len()
    );

    Ok(response)
}
