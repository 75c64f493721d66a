// Resume skill-gap analysis.
// Implements: blueprint lookup, keyword matching, gap scoring, AI response
// mapping and the orchestrator that sequences them.
// All model calls go through llm_client::LanguageModel.

pub mod ai_mapper;
pub mod blueprint;
pub mod gap;
pub mod handlers;
pub mod matcher;
pub mod orchestrator;
pub mod prompts;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Malformed AI response: {0}")]
    MalformedAiResponse(String),
}

/// Untuned heuristics of the analysis, kept configurable.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPolicy {
    /// A static score that is positive but below this is raised to it.
    pub score_floor: u32,
    /// Score for model "extra" skills that have no entry in `skillScores`.
    pub extra_skill_default_score: u32,
}

impl Default for AnalysisPolicy {
    fn default() -> Self {
        Self {
            score_floor: 40,
            extra_skill_default_score: 50,
        }
    }
}
