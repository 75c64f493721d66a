//! Maps the model's free-form analysis output onto `AnalysisResult`.
//!
//! This is the trust boundary between generated text and the canonical
//! result. Every field access degrades to a default; only text that is not a
//! JSON object at all is rejected.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};

use crate::analysis::{AnalysisError, AnalysisPolicy};
use crate::llm_client::strip_json_fences;
use crate::models::analysis::{
    ActionableTip, AnalysisResult, CriticalGap, ReadinessLevel, ResumeFeedback, RoadmapPhase,
    Skill, SkillCategory,
};

/// Category keys used by the model, in reporting order.
const CATEGORY_KEYS: [(&str, SkillCategory); 3] = [
    ("technical", SkillCategory::Technical),
    ("soft", SkillCategory::Soft),
    ("nonTechnical", SkillCategory::Professional),
];

pub struct AiResponseMapper<'a> {
    policy: &'a AnalysisPolicy,
}

impl<'a> AiResponseMapper<'a> {
    pub fn new(policy: &'a AnalysisPolicy) -> Self {
        Self { policy }
    }

    pub fn map(&self, raw: &str) -> Result<AnalysisResult, AnalysisError> {
        let root = parse_object(raw)?;

        let overall_score = root.get("overallScore").and_then(as_score).unwrap_or(0);

        let score_lookup: BTreeMap<String, u32> = root
            .get("skillScores")
            .and_then(Value::as_object)
            .map(|scores| {
                scores
                    .iter()
                    .filter_map(|(name, v)| as_score(v).map(|s| (name.clone(), s)))
                    .collect()
            })
            .unwrap_or_default();

        let mut extracted = SkillList::default();
        if let Some(matched) = root.get("matchedSkills").and_then(Value::as_object) {
            for (key, category) in CATEGORY_KEYS {
                for name in names(matched.get(key)) {
                    let score = score_lookup.get(&name).copied().unwrap_or(0);
                    extracted.push(Skill::found(&name, category, score));
                }
            }
        }
        for name in names(root.get("extraSkills")) {
            let score = score_lookup
                .get(&name)
                .copied()
                .unwrap_or(self.policy.extra_skill_default_score);
            extracted.push(Skill::extra(&name, score));
        }

        let mut missing = SkillList::default();
        if let Some(missing_obj) = root.get("missingSkills").and_then(Value::as_object) {
            for (key, category) in CATEGORY_KEYS {
                for name in names(missing_obj.get(key)) {
                    missing.push(Skill::missing(&name, category));
                }
            }
        }

        let extracted = extracted.into_inner();
        let extracted_names: HashSet<&str> = extracted.iter().map(|s| s.name.as_str()).collect();
        let skill_scores: BTreeMap<String, u32> = score_lookup
            .iter()
            .filter(|(name, _)| extracted_names.contains(name.as_str()))
            .map(|(name, score)| (name.clone(), *score))
            .collect();

        Ok(AnalysisResult {
            extracted,
            missing: missing.into_inner(),
            critical_gaps: list_of(root.get("criticalGaps"), critical_gap),
            roadmap: list_of(root.get("roadmap"), roadmap_phase),
            resume_feedback: root
                .get("resumeFeedback")
                .and_then(Value::as_object)
                .map(resume_feedback),
            readiness_level: root
                .get("readinessLevel")
                .and_then(Value::as_str)
                .and_then(ReadinessLevel::parse_label),
            gap_summary: root.get("gapSummary").and_then(string),
            overall_score,
            skill_scores,
            ai_error: None,
        })
    }
}

/// Fence-strips and decodes the raw text into a JSON object.
pub fn parse_object(raw: &str) -> Result<Map<String, Value>, AnalysisError> {
    let text = strip_json_fences(raw);
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(root)) => Ok(root),
        Ok(other) => Err(AnalysisError::MalformedAiResponse(format!(
            "expected a JSON object, got {}",
            kind(&other)
        ))),
        Err(e) => Err(AnalysisError::MalformedAiResponse(e.to_string())),
    }
}

/// Skills deduplicated by name; first occurrence wins.
#[derive(Default)]
struct SkillList {
    seen: HashSet<String>,
    skills: Vec<Skill>,
}

impl SkillList {
    fn push(&mut self, skill: Skill) {
        if self.seen.insert(skill.name.clone()) {
            self.skills.push(skill);
        }
    }

    fn into_inner(self) -> Vec<Skill> {
        self.skills
    }
}

/// Non-blank trimmed strings of an optional array. Everything else is skipped.
fn names(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(string).collect())
        .unwrap_or_default()
}

fn string(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Integer, float or numeric-string score, clamped to 0–100.
fn as_score(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as u32)
}

fn list_of<T>(value: Option<&Value>, item: fn(&Map<String, Value>) -> T) -> Vec<T> {
    value
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_object).map(item).collect())
        .unwrap_or_default()
}

fn field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key).and_then(string).unwrap_or_default()
}

fn critical_gap(obj: &Map<String, Value>) -> CriticalGap {
    CriticalGap {
        skill: field(obj, "skill"),
        reason: field(obj, "reason"),
        learning_url: field(obj, "learningUrl"),
        source_name: field(obj, "sourceName"),
    }
}

fn roadmap_phase(obj: &Map<String, Value>) -> RoadmapPhase {
    RoadmapPhase {
        title: field(obj, "title"),
        duration: field(obj, "duration"),
        tasks: names(obj.get("tasks")),
    }
}

fn actionable_tip(obj: &Map<String, Value>) -> ActionableTip {
    ActionableTip {
        tip_type: field(obj, "type"),
        tip: field(obj, "tip"),
    }
}

fn resume_feedback(obj: &Map<String, Value>) -> ResumeFeedback {
    ResumeFeedback {
        score: obj.get("score").and_then(as_score).unwrap_or(0),
        strengths: names(obj.get("strengths")),
        summary: field(obj, "summary"),
        missing_keywords: names(obj.get("missingKeywords")),
        actionable_feedback: list_of(obj.get("actionableFeedback"), actionable_tip),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
