use axum::{extract::State, http::HeaderMap, Json};

use crate::analysis::handlers::API_KEY_HEADER;
use crate::assessment::generator::{generate_assessment, AssessmentError};
use crate::errors::AppError;
use crate::language::ResponseLanguage;
use crate::llm_client::resolve_credential;
use crate::models::assessment::{AssessmentRequest, AssessmentResponse};
use crate::state::AppState;

/// POST /api/assessment/generate
pub async fn handle_generate_assessment(
    State(state): State<AppState>,
    language: ResponseLanguage,
    headers: HeaderMap,
    Json(request): Json<AssessmentRequest>,
) -> Result<Json<AssessmentResponse>, AppError> {
    let supplied = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    let api_key = resolve_credential(supplied, state.config.gemini_api_key.as_deref())
        .ok_or_else(|| AppError::Validation("A Gemini API key is required".to_string()))?;

    let response = generate_assessment(state.llm.as_ref(), &api_key, &request.skills, &language)
        .await
        .map_err(|e| match e {
            AssessmentError::NoSkills => {
                AppError::Validation("At least one skill is required".to_string())
            }
            other => AppError::Llm(other.to_string()),
        })?;

    Ok(Json(response))
}
