mod analysis;
mod assessment;
mod config;
mod errors;
mod ingest;
mod language;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::blueprint::RoleBlueprintStore;
use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Skill Gap API v{}", env!("CARGO_PKG_VERSION"));

    // Taxonomy is required: without it there is no static analysis
    let blueprints = RoleBlueprintStore::load(&config.skills_taxonomy_path)?;

    let llm = GeminiClient::new(config.gemini_model.clone())?;
    info!("LLM client initialized (model: {})", llm.model());
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY not set; requests without X-Gemini-API-Key use static analysis only");
    }

    let state = AppState {
        blueprints: Arc::new(blueprints),
        llm: Arc::new(llm),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
