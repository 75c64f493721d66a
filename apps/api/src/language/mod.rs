//! Response language: which language analysis and assessment output is
//! delivered in. Resolved per request from the `app_language` cookie.

pub mod handlers;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::convert::Infallible;

pub const COOKIE_NAME: &str = "app_language";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const COOKIE_MAX_AGE_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseLanguage {
    code: String,
}

impl Default for ResponseLanguage {
    fn default() -> Self {
        Self {
            code: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl ResponseLanguage {
    /// Accepts 2–5 lowercase ASCII letters ("en", "fr", "zh", ...).
    pub fn parse(code: &str) -> Option<Self> {
        let valid = (2..=5).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_lowercase());
        valid.then(|| Self {
            code: code.to_string(),
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_default(&self) -> bool {
        self.code == DEFAULT_LANGUAGE
    }

    /// English name used inside prompts. Unknown codes pass through as-is.
    pub fn display_name(&self) -> &str {
        match self.code.as_str() {
            "en" => "English",
            "fr" => "French",
            "es" => "Spanish",
            "de" => "German",
            "it" => "Italian",
            "pt" => "Portuguese",
            "nl" => "Dutch",
            "ru" => "Russian",
            "ar" => "Arabic",
            "hi" => "Hindi",
            "bn" => "Bengali",
            "ta" => "Tamil",
            "te" => "Telugu",
            "kn" => "Kannada",
            "ml" => "Malayalam",
            "mr" => "Marathi",
            "ja" => "Japanese",
            "ko" => "Korean",
            "zh" => "Chinese",
            other => other,
        }
    }

    /// Reads the preference cookie out of the request's cookie jar.
    pub fn from_jar(jar: &CookieJar) -> Option<Self> {
        jar.get(COOKIE_NAME)
            .and_then(|cookie| Self::parse(cookie.value().trim()))
    }

    pub fn to_cookie(&self) -> Cookie<'static> {
        Cookie::build((COOKIE_NAME, self.code.clone()))
            .path("/")
            .max_age(time::Duration::days(COOKIE_MAX_AGE_DAYS))
            .same_site(SameSite::Lax)
            .build()
    }
}

/// Missing or invalid cookies resolve to the default language; this extractor never rejects.
#[async_trait]
impl<S> FromRequestParts<S> for ResponseLanguage
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Self::from_jar(&jar).unwrap_or_default())
    }
}
