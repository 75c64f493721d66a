//! Axum route handlers for the language preference API.

use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::language::ResponseLanguage;

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguagePreference {
    pub language: String,
}

/// GET /api/user/language
pub async fn handle_get_language(language: ResponseLanguage) -> Json<LanguagePreference> {
    Json(LanguagePreference {
        language: language.code().to_string(),
    })
}

/// POST /api/user/language
///
/// Validates the code and stores it in the `app_language` cookie.
pub async fn handle_set_language(
    jar: CookieJar,
    Json(request): Json<LanguagePreference>,
) -> Result<(CookieJar, Json<LanguagePreference>), AppError> {
    let language = ResponseLanguage::parse(&request.language).ok_or_else(|| {
        AppError::Validation(format!("Invalid language code: {}", request.language))
    })?;

    debug!("Language preference set to {}", language.code());

    Ok((
        jar.add(language.to_cookie()),
        Json(LanguagePreference {
            language: language.code().to_string(),
        }),
    ))
}
