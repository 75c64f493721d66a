use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Skill category as used by the taxonomy, the blueprints and the AI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Technical,
    Soft,
    Professional,
}

/// A single extracted or missing skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(rename = "type")]
    pub category: SkillCategory,
    pub id: String,
    /// 0 – 100
    #[serde(default)]
    pub score: u32,
}

impl Skill {
    /// A skill found in the resume (`id_<name>`).
    pub fn found(name: &str, category: SkillCategory, score: u32) -> Self {
        Self {
            name: name.to_string(),
            category,
            id: format!("id_{name}"),
            score,
        }
    }

    /// A required skill absent from the resume (`miss_<name>`). Always scores 0.
    pub fn missing(name: &str, category: SkillCategory) -> Self {
        Self {
            name: name.to_string(),
            category,
            id: format!("miss_{name}"),
            score: 0,
        }
    }

    /// A skill the model found outside any category (`extra_<name>`).
    pub fn extra(name: &str, score: u32) -> Self {
        Self {
            name: name.to_string(),
            category: SkillCategory::Technical,
            id: format!("extra_{name}"),
            score,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CriticalGap {
    pub skill: String,
    pub reason: String,
    pub learning_url: String,
    pub source_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadmapPhase {
    pub title: String,
    pub duration: String,
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionableTip {
    #[serde(rename = "type")]
    pub tip_type: String,
    pub tip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeFeedback {
    pub score: u32,
    pub strengths: Vec<String>,
    pub summary: String,
    pub missing_keywords: Vec<String>,
    pub actionable_feedback: Vec<ActionableTip>,
}

/// Coarse seniority label derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessLevel {
    Junior,
    MidLevel,
    Senior,
}

impl ReadinessLevel {
    /// Senior above 80, Mid-Level above 60, Junior otherwise.
    pub fn from_score(score: u32) -> Self {
        if score > 80 {
            ReadinessLevel::Senior
        } else if score > 60 {
            ReadinessLevel::MidLevel
        } else {
            ReadinessLevel::Junior
        }
    }

    /// Lenient label parsing for model output ("Mid", "mid-level", "SENIOR", ...).
    pub fn parse_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match normalized.as_str() {
            "junior" => Some(ReadinessLevel::Junior),
            "mid" | "midlevel" => Some(ReadinessLevel::MidLevel),
            "senior" => Some(ReadinessLevel::Senior),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessLevel::Junior => "Junior",
            ReadinessLevel::MidLevel => "Mid-Level",
            ReadinessLevel::Senior => "Senior",
        }
    }
}

impl fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReadinessLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReadinessLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        ReadinessLevel::parse_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown readiness level '{label}'")))
    }
}

/// Unknown labels decode as unset instead of failing the whole result.
fn lenient_readiness<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<ReadinessLevel>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(ReadinessLevel::parse_label))
}

/// Canonical result of one resume analysis. Built fresh per request, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisResult {
    pub extracted: Vec<Skill>,
    pub missing: Vec<Skill>,
    pub critical_gaps: Vec<CriticalGap>,
    pub roadmap: Vec<RoadmapPhase>,
    pub resume_feedback: Option<ResumeFeedback>,
    #[serde(deserialize_with = "lenient_readiness")]
    pub readiness_level: Option<ReadinessLevel>,
    pub gap_summary: Option<String>,
    /// 0 – 100
    pub overall_score: u32,
    pub skill_scores: BTreeMap<String, u32>,
    /// Non-fatal annotation set when the AI path failed and the static fallback answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
}

impl AnalysisResult {
    /// Returns the same result carrying a non-fatal error annotation.
    pub fn with_ai_error(self, annotation: impl Into<String>) -> Self {
        Self {
            ai_error: Some(annotation.into()),
            ..self
        }
    }
}
