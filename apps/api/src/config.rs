use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::analysis::AnalysisPolicy;
use crate::llm_client::DEFAULT_MODEL;

/// Application configuration loaded from environment variables.
/// Everything has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Process-wide Gemini key. Callers may override it per request.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub skills_taxonomy_path: PathBuf,
    pub max_upload_bytes: usize,
    pub policy: AnalysisPolicy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = AnalysisPolicy::default();

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            skills_taxonomy_path: optional_env("SKILLS_TAXONOMY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/skills.json")),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            policy: AnalysisPolicy {
                score_floor: parse_env("SCORE_FLOOR", defaults.score_floor)?,
                extra_skill_default_score: parse_env(
                    "EXTRA_SKILL_DEFAULT_SCORE",
                    defaults.extra_skill_default_score,
                )?,
            },
            port: parse_env("PORT", 8084)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Blank values count as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
