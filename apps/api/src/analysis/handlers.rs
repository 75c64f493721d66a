use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::analysis::orchestrator::{AnalysisOrchestrator, AnalysisRequest};
use crate::errors::AppError;
use crate::ingest::extract_text;
use crate::language::ResponseLanguage;
use crate::llm_client::resolve_credential;
use crate::models::analysis::AnalysisResult;
use crate::state::AppState;

/// Caller-supplied model credential. Overrides the configured key.
pub const API_KEY_HEADER: &str = "X-Gemini-API-Key";
pub const DEFAULT_ROLE_ID: &str = "backend";

struct ResumeUpload {
    filename: String,
    bytes: Bytes,
}

/// POST /api/resume/analyze
///
/// Multipart form: `file` (pdf, docx or txt) and optional `roleId`.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    language: ResponseLanguage,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let mut upload: Option<ResumeUpload> = None;
    let mut role_id = DEFAULT_ROLE_ID.to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid file: {e}")))?;
                upload = Some(ResumeUpload { filename, bytes });
            }
            Some("roleId") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid roleId: {e}")))?;
                if !value.trim().is_empty() {
                    role_id = value.trim().to_string();
                }
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;

    info!(
        "Analyzing resume '{}' ({} bytes) for role '{}' in '{}'",
        upload.filename,
        upload.bytes.len(),
        role_id,
        language.code()
    );

    let text = tokio::task::spawn_blocking(move || extract_text(&upload.bytes, &upload.filename))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let supplied = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    let api_key = resolve_credential(supplied, state.config.gemini_api_key.as_deref());

    let orchestrator = AnalysisOrchestrator::new(
        &state.blueprints,
        state.llm.as_ref(),
        &state.config.policy,
    );
    let result = orchestrator
        .analyze(AnalysisRequest {
            text: &text,
            role_id: &role_id,
            api_key: api_key.as_deref(),
            language: &language,
        })
        .await;

    Ok(Json(result))
}
