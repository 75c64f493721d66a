//! Analysis orchestrator: sequences the optional English pre-pass, the AI
//! attempt, the static fallback and the optional localization post-pass.
//!
//! ```text
//! Ingested → [Translated] → AIAttempted → AISucceeded [→ Localized] → Done
//!                                       ↘ AIFailed → StaticFallback → Done
//! (no credential) ─────────────────────────────────↗
//! ```
//!
//! Only blank input short-circuits; every collaborator failure degrades to a
//! best-effort result.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use crate::analysis::ai_mapper::AiResponseMapper;
use crate::analysis::blueprint::{RoleBlueprint, RoleBlueprintStore};
use crate::analysis::gap::GapAnalyzer;
use crate::analysis::matcher::KeywordSkillMatcher;
use crate::analysis::prompts::{analysis_prompt, DYNAMIC_MODE_DIRECTIVE};
use crate::analysis::AnalysisPolicy;
use crate::language::ResponseLanguage;
use crate::llm_client::prompts::{localize_json_prompt, request_seed, translate_to_english_prompt};
use crate::llm_client::{strip_json_fences, LanguageModel};
use crate::models::analysis::{AnalysisResult, CriticalGap, ResumeFeedback, Skill};

/// Upper bound on resume characters sent to the model.
pub const MAX_PROMPT_RESUME_CHARS: usize = 15_000;

pub struct AnalysisRequest<'a> {
    pub text: &'a str,
    pub role_id: &'a str,
    /// Already resolved: caller-supplied key or the configured default.
    pub api_key: Option<&'a str>,
    pub language: &'a ResponseLanguage,
}

/// Result of the AI attempt. The failure carries the annotation the
/// fallback result will expose.
#[derive(Debug)]
pub enum AiOutcome {
    Succeeded(AnalysisResult),
    Failed(String),
}

pub struct AnalysisOrchestrator<'a> {
    store: &'a RoleBlueprintStore,
    llm: &'a dyn LanguageModel,
    policy: &'a AnalysisPolicy,
}

impl<'a> AnalysisOrchestrator<'a> {
    pub fn new(
        store: &'a RoleBlueprintStore,
        llm: &'a dyn LanguageModel,
        policy: &'a AnalysisPolicy,
    ) -> Self {
        Self { store, llm, policy }
    }

    pub async fn analyze(&self, request: AnalysisRequest<'_>) -> AnalysisResult {
        if request.text.trim().is_empty() {
            debug!("Blank resume text; returning empty analysis");
            return AnalysisResult::default();
        }

        let text = match request.api_key {
            Some(api_key) => self.translate_to_english(request.text, api_key).await,
            None => request.text.to_string(),
        };

        let blueprint = self.store.get_role_definition(request.role_id);
        match blueprint {
            Some(b) => debug!("Resolved role '{}' to blueprint '{}'", request.role_id, b.key),
            None => info!("No blueprint for role '{}'; dynamic mode", request.role_id),
        }

        let Some(api_key) = request.api_key else {
            info!("No model credential; using static analysis");
            return self.static_fallback(&text, blueprint, None);
        };

        let description = blueprint
            .map(RoleBlueprint::render_for_prompt)
            .unwrap_or_else(|| DYNAMIC_MODE_DIRECTIVE.to_string());

        match self
            .attempt_ai(&text, request.role_id, &description, api_key)
            .await
        {
            AiOutcome::Succeeded(result) => {
                self.localize(result, request.language, api_key).await
            }
            AiOutcome::Failed(annotation) => {
                warn!("{annotation}; falling back to static analysis");
                self.static_fallback(&text, blueprint, Some(annotation))
            }
        }
    }

    /// Any failure keeps the original text.
    async fn translate_to_english(&self, text: &str, api_key: &str) -> String {
        match self
            .llm
            .generate(&translate_to_english_prompt(text), api_key)
            .await
        {
            Ok(translated) if !translated.trim().is_empty() => {
                debug!("English pre-pass applied");
                translated
            }
            Ok(_) => {
                debug!("English pre-pass returned nothing; keeping original text");
                text.to_string()
            }
            Err(e) => {
                debug!("English pre-pass failed ({e}); keeping original text");
                text.to_string()
            }
        }
    }

    pub async fn attempt_ai(
        &self,
        text: &str,
        role_id: &str,
        blueprint_description: &str,
        api_key: &str,
    ) -> AiOutcome {
        let prompt = analysis_prompt(
            role_id,
            blueprint_description,
            &request_seed(),
            truncate_chars(text, MAX_PROMPT_RESUME_CHARS),
        );

        let raw = match self.llm.generate(&prompt, api_key).await {
            Ok(raw) => raw,
            Err(e) => return AiOutcome::Failed(format!("AI Engine Failed: {e}")),
        };

        match AiResponseMapper::new(self.policy).map(&raw) {
            Ok(result) => {
                info!(
                    "AI analysis succeeded: score={}, extracted={}, missing={}",
                    result.overall_score,
                    result.extracted.len(),
                    result.missing.len()
                );
                AiOutcome::Succeeded(result)
            }
            Err(e) => AiOutcome::Failed(format!("AI Engine Failed: {e}")),
        }
    }

    /// Keyword matching + gap analysis, annotated with the AI failure if any.
    pub fn static_fallback(
        &self,
        text: &str,
        blueprint: Option<&RoleBlueprint>,
        ai_error: Option<String>,
    ) -> AnalysisResult {
        let extracted = KeywordSkillMatcher::new(self.store.skills()).extract(text);
        let result = GapAnalyzer::new(self.policy).analyze(extracted, blueprint);
        info!(
            "Static analysis: score={}, extracted={}, missing={}",
            result.overall_score,
            result.extracted.len(),
            result.missing.len()
        );
        match ai_error {
            Some(annotation) => result.with_ai_error(annotation),
            None => result,
        }
    }

    /// Localization never fails the request: any problem returns `result` untouched.
    async fn localize(
        &self,
        result: AnalysisResult,
        language: &ResponseLanguage,
        api_key: &str,
    ) -> AnalysisResult {
        if language.is_default() {
            return result;
        }

        let serialized = match serde_json::to_string(&result) {
            Ok(json) => json,
            Err(e) => {
                warn!("Could not serialize result for localization: {e}");
                return result;
            }
        };

        let prompt = localize_json_prompt(&serialized, language.display_name());
        let raw = match self.llm.generate(&prompt, api_key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Localization to '{}' failed: {e}", language.code());
                return result;
            }
        };

        let localized = match serde_json::from_str::<AnalysisResult>(strip_json_fences(&raw)) {
            Ok(localized) => localized,
            Err(e) => {
                warn!("Localized result for '{}' is not decodable: {e}", language.code());
                return result;
            }
        };

        match merge_localized(&result, localized) {
            Some(merged) => {
                debug!("Result localized to '{}'", language.code());
                merged
            }
            None => {
                warn!("Localized result for '{}' changed structure; discarded", language.code());
                result
            }
        }
    }
}

/// Takes the translated text from `localized` and everything else from
/// `original`. Returns `None` when any list no longer lines up or a
/// translation collapsed two skill names into one.
fn merge_localized(original: &AnalysisResult, localized: AnalysisResult) -> Option<AnalysisResult> {
    let extracted = relabel(&original.extracted, localized.extracted)?;
    let missing = relabel(&original.missing, localized.missing)?;

    if original.critical_gaps.len() != localized.critical_gaps.len()
        || original.roadmap.len() != localized.roadmap.len()
    {
        return None;
    }
    let critical_gaps = original
        .critical_gaps
        .iter()
        .zip(localized.critical_gaps)
        .map(|(before, after)| CriticalGap {
            learning_url: before.learning_url.clone(),
            ..after
        })
        .collect();

    let skill_scores: BTreeMap<String, u32> = original
        .extracted
        .iter()
        .zip(&extracted)
        .filter_map(|(before, after)| {
            original
                .skill_scores
                .get(&before.name)
                .map(|score| (after.name.clone(), *score))
        })
        .collect();

    let resume_feedback = match (&original.resume_feedback, localized.resume_feedback) {
        (Some(before), Some(after)) => Some(ResumeFeedback {
            score: before.score,
            ..after
        }),
        (before, _) => before.clone(),
    };

    Some(AnalysisResult {
        extracted,
        missing,
        critical_gaps,
        roadmap: localized.roadmap,
        resume_feedback,
        readiness_level: original.readiness_level,
        gap_summary: localized.gap_summary.or_else(|| original.gap_summary.clone()),
        overall_score: original.overall_score,
        skill_scores,
        ai_error: original.ai_error.clone(),
    })
}

/// Translated names over the original ids, categories and scores.
fn relabel(original: &[Skill], localized: Vec<Skill>) -> Option<Vec<Skill>> {
    if original.len() != localized.len() {
        return None;
    }
    let mut seen = HashSet::new();
    original
        .iter()
        .zip(localized)
        .map(|(before, after)| {
            let name = if after.name.trim().is_empty() {
                before.name.clone()
            } else {
                after.name
            };
            seen.insert(name.clone()).then(|| Skill {
                name,
                ..before.clone()
            })
        })
        .collect()
}

/// At most `max` characters, cut on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::llm_client::LlmError;
    use crate::models::analysis::{ReadinessLevel, SkillCategory};

    const TAXONOMY: &str = r#"{
        "skills": [
            {"name": "Java", "type": "technical", "keywords": ["java"]},
            {"name": "SQL", "type": "technical", "keywords": ["sql", "postgres"]},
            {"name": "Communication", "type": "soft", "keywords": ["communication"]}
        ],
        "roles": {
            "backend": {"tech": ["Java", "SQL"], "soft": ["Communication"]}
        }
    }"#;

    const AI_RESPONSE: &str = r#"```json
{"overallScore": 88, "matchedSkills": {"technical": ["Java", "SQL"]}, "skillScores": {"Java": 90, "SQL": 80},
 "missingSkills": {"soft": ["Communication"]}, "readinessLevel": "Senior", "gapSummary": "Strong backend fit."}
```"#;

    /// Scripted model: answers by prompt kind, records every prompt it sees.
    #[derive(Default)]
    struct ScriptedModel {
        translate: Option<Result<String, ()>>,
        analyze: Option<Result<String, ()>>,
        localize: Option<Result<String, ()>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate(&self, prompt: &str, _api_key: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let scripted = if prompt.starts_with("Translate to English") {
                &self.translate
            } else if prompt.starts_with("Translate the following JSON") {
                &self.localize
            } else {
                &self.analyze
            };
            match scripted {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(())) => Err(LlmError::Api {
                    status: 503,
                    message: "model overloaded".to_string(),
                }),
                None => Err(LlmError::EmptyContent),
            }
        }
    }

    fn store() -> RoleBlueprintStore {
        RoleBlueprintStore::from_json(TAXONOMY).unwrap()
    }

    async fn run(
        model: &ScriptedModel,
        text: &str,
        role: &str,
        api_key: Option<&str>,
        language: &ResponseLanguage,
    ) -> AnalysisResult {
        let store = store();
        let policy = AnalysisPolicy::default();
        AnalysisOrchestrator::new(&store, model, &policy)
            .analyze(AnalysisRequest {
                text,
                role_id: role,
                api_key,
                language,
            })
            .await
    }

    #[tokio::test]
    async fn test_blank_text_returns_empty_result() {
        let model = ScriptedModel::default();
        let result = run(&model, "  \n\t ", "backend", Some("key"), &ResponseLanguage::default()).await;
        assert_eq!(result, AnalysisResult::default());
        assert!(result.ai_error.is_none());
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_no_credential_goes_straight_to_static() {
        let model = ScriptedModel::default();
        let result = run(&model, "Java developer", "Backend Developer", None, &ResponseLanguage::default()).await;

        assert!(model.prompts().is_empty());
        assert!(result.ai_error.is_none());
        assert_eq!(result.extracted.len(), 1);
        let missing: Vec<&str> = result.missing.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(missing, vec!["SQL", "Communication"]);
        assert_eq!(result.overall_score, 40);
    }

    #[tokio::test]
    async fn test_ai_success_uses_mapped_result() {
        let model = ScriptedModel {
            translate: Some(Ok("Java and Postgres engineer".to_string())),
            analyze: Some(Ok(AI_RESPONSE.to_string())),
            ..Default::default()
        };
        let result = run(&model, "Ingeniero Java", "backend", Some("key"), &ResponseLanguage::default()).await;

        assert_eq!(result.overall_score, 88);
        assert_eq!(result.extracted.len(), 2);
        assert_eq!(result.missing[0].category, SkillCategory::Soft);
        assert_eq!(result.readiness_level, Some(ReadinessLevel::Senior));
        assert!(result.ai_error.is_none());

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 2);
        // The analysis prompt sees the translated text and the rendered blueprint.
        assert!(prompts[1].contains("Java and Postgres engineer"));
        assert!(prompts[1].contains(r#"Technical: ["Java","SQL"]"#));
    }

    #[tokio::test]
    async fn test_unknown_role_uses_dynamic_mode() {
        let model = ScriptedModel {
            translate: Some(Ok("Java".to_string())),
            analyze: Some(Ok(AI_RESPONSE.to_string())),
            ..Default::default()
        };
        run(&model, "Java", "astronaut", Some("key"), &ResponseLanguage::default()).await;
        assert!(model.prompts()[1].contains("[DYNAMIC MODE]"));
    }

    #[tokio::test]
    async fn test_malformed_ai_output_falls_back_with_annotation() {
        let model = ScriptedModel {
            translate: Some(Err(())),
            analyze: Some(Ok("Sorry, I can't help with that.".to_string())),
            ..Default::default()
        };
        let result = run(&model, "java postgres communication", "backend", Some("key"), &ResponseLanguage::default()).await;

        let annotation = result.ai_error.as_deref().unwrap();
        assert!(annotation.starts_with("AI Engine Failed:"), "{annotation}");
        assert!(annotation.contains("Malformed AI response"), "{annotation}");
        // Static path over the untranslated text.
        assert_eq!(result.overall_score, 100);
        assert!(result.missing.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back_with_annotation() {
        let model = ScriptedModel {
            translate: Some(Ok("java".to_string())),
            analyze: Some(Err(())),
            ..Default::default()
        };
        let result = run(&model, "java", "backend", Some("key"), &ResponseLanguage::default()).await;
        assert!(result.ai_error.unwrap().contains("model overloaded"));
        assert_eq!(result.overall_score, 40);
    }

    #[tokio::test]
    async fn test_failed_translation_keeps_original_text() {
        let model = ScriptedModel {
            translate: Some(Ok("   ".to_string())),
            analyze: Some(Ok(AI_RESPONSE.to_string())),
            ..Default::default()
        };
        run(&model, "Desarrolladora Java", "backend", Some("key"), &ResponseLanguage::default()).await;
        assert!(model.prompts()[1].contains("Desarrolladora Java"));
    }

    #[tokio::test]
    async fn test_resume_text_is_truncated_in_prompt() {
        let model = ScriptedModel {
            translate: Some(Err(())),
            analyze: Some(Ok(AI_RESPONSE.to_string())),
            ..Default::default()
        };
        let long = format!("{}{}", "é".repeat(MAX_PROMPT_RESUME_CHARS), "TAIL_MARKER");
        run(&model, &long, "backend", Some("key"), &ResponseLanguage::default()).await;
        let prompt = &model.prompts()[1];
        assert!(!prompt.contains("TAIL_MARKER"));
        assert!(prompt.contains(&"é".repeat(MAX_PROMPT_RESUME_CHARS)));
    }

    #[tokio::test]
    async fn test_localization_replaces_text_keeps_scores() {
        let localized = r#"{
            "extracted": [
                {"name": "Java", "type": "technical", "id": "id_Java", "score": 1},
                {"name": "SQL (langage)", "type": "technical", "id": "id_SQL", "score": 1}
            ],
            "missing": [{"name": "Communication", "type": "soft", "id": "miss_Communication", "score": 0}],
            "overallScore": 3,
            "readinessLevel": "Confirmé",
            "gapSummary": "Très bon profil backend.",
            "skillScores": {}
        }"#;
        let model = ScriptedModel {
            translate: Some(Ok("java".to_string())),
            analyze: Some(Ok(AI_RESPONSE.to_string())),
            localize: Some(Ok(localized.to_string())),
            ..Default::default()
        };
        let french = ResponseLanguage::parse("fr").unwrap();
        let result = run(&model, "java", "backend", Some("key"), &french).await;

        assert_eq!(result.gap_summary.as_deref(), Some("Très bon profil backend."));
        assert_eq!(result.extracted[1].name, "SQL (langage)");
        assert_eq!(result.extracted[1].score, 80);
        assert_eq!(result.skill_scores.get("SQL (langage)"), Some(&80));
        assert_eq!(result.overall_score, 88);
        assert_eq!(result.readiness_level, Some(ReadinessLevel::Senior));
        assert!(model.prompts()[2].contains("to French."));
    }

    #[tokio::test]
    async fn test_localization_failure_keeps_unlocalized_result() {
        let model = ScriptedModel {
            translate: Some(Ok("java".to_string())),
            analyze: Some(Ok(AI_RESPONSE.to_string())),
            localize: Some(Ok("Voici la traduction :".to_string())),
            ..Default::default()
        };
        let german = ResponseLanguage::parse("de").unwrap();
        let result = run(&model, "java", "backend", Some("key"), &german).await;
        assert_eq!(result.gap_summary.as_deref(), Some("Strong backend fit."));
        assert!(result.ai_error.is_none());
    }

    #[tokio::test]
    async fn test_localization_that_drops_skills_is_discarded() {
        let model = ScriptedModel {
            translate: Some(Ok("java".to_string())),
            analyze: Some(Ok(AI_RESPONSE.to_string())),
            localize: Some(Ok(r#"{"extracted": [], "gapSummary": "Bon profil."}"#.to_string())),
            ..Default::default()
        };
        let french = ResponseLanguage::parse("fr").unwrap();
        let result = run(&model, "java", "backend", Some("key"), &french).await;
        assert_eq!(result.extracted.len(), 2);
        assert_eq!(result.gap_summary.as_deref(), Some("Strong backend fit."));
    }

    #[tokio::test]
    async fn test_localization_that_drops_gaps_and_roadmap_is_discarded() {
        let analysis = r#"{"overallScore": 70, "matchedSkills": {"technical": ["Java"]},
            "missingSkills": {"technical": ["Docker"]},
            "criticalGaps": [{"skill": "Docker", "reason": "Needed for deployment",
                "learningUrl": "https://docs.docker.com/", "sourceName": "Docker Docs"}],
            "roadmap": [{"title": "Phase 1", "duration": "2 Weeks", "tasks": ["Learn Docker"]}]}"#;
        let localized = r#"{
            "extracted": [{"name": "Java", "type": "technical", "id": "id_Java", "score": 0}],
            "missing": [{"name": "Docker", "type": "technical", "id": "miss_Docker", "score": 0}],
            "gapSummary": "Il manque Docker."
        }"#;
        let model = ScriptedModel {
            translate: Some(Ok("java".to_string())),
            analyze: Some(Ok(analysis.to_string())),
            localize: Some(Ok(localized.to_string())),
            ..Default::default()
        };
        let french = ResponseLanguage::parse("fr").unwrap();
        let result = run(&model, "java", "backend", Some("key"), &french).await;

        assert_eq!(result.critical_gaps.len(), 1);
        assert_eq!(result.critical_gaps[0].reason, "Needed for deployment");
        assert_eq!(result.roadmap.len(), 1);
        assert!(result.gap_summary.is_none());
    }

    #[test]
    fn test_merge_translates_gaps_but_keeps_links() {
        let gap = |reason: &str, url: &str| CriticalGap {
            skill: "Docker".to_string(),
            reason: reason.to_string(),
            learning_url: url.to_string(),
            source_name: "Docs".to_string(),
        };
        let original = AnalysisResult {
            critical_gaps: vec![gap("Required for this role", "https://docs.docker.com/")],
            ..Default::default()
        };
        let localized = AnalysisResult {
            critical_gaps: vec![gap("Requis pour ce poste", "https://docs.docker.com/fr/")],
            ..Default::default()
        };

        let merged = merge_localized(&original, localized).unwrap();
        assert_eq!(merged.critical_gaps[0].reason, "Requis pour ce poste");
        assert_eq!(merged.critical_gaps[0].learning_url, "https://docs.docker.com/");
    }

    #[tokio::test]
    async fn test_default_language_skips_localization() {
        let model = ScriptedModel {
            translate: Some(Ok("java".to_string())),
            analyze: Some(Ok(AI_RESPONSE.to_string())),
            localize: Some(Ok("{}".to_string())),
            ..Default::default()
        };
        run(&model, "java", "backend", Some("key"), &ResponseLanguage::default()).await;
        assert_eq!(model.prompts().len(), 2);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_relabel_rejects_collapsed_names() {
        let original = vec![
            Skill::found("Teamwork", SkillCategory::Soft, 70),
            Skill::found("Collaboration", SkillCategory::Soft, 60),
        ];
        let localized = vec![
            Skill::found("Travail d'équipe", SkillCategory::Soft, 0),
            Skill::found("Travail d'équipe", SkillCategory::Soft, 0),
        ];
        assert!(relabel(&original, localized).is_none());
    }
}
