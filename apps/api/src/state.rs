use std::sync::Arc;

use crate::analysis::blueprint::RoleBlueprintStore;
use crate::config::Config;
use crate::llm_client::LanguageModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup, read-only afterwards.
    pub blueprints: Arc<RoleBlueprintStore>,
    /// Default: GeminiClient. Tests swap in scripted models.
    pub llm: Arc<dyn LanguageModel>,
    pub config: Config,
}
