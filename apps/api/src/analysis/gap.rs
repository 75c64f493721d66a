//! Gap analysis for the static path: missing skills, critical gaps,
//! overall score, readiness, roadmap and resume feedback from keyword matches.
//!
//! Scoring is binary: a found skill scores 100, there is no partial credit.

use std::collections::{BTreeMap, HashSet};

use reqwest::Url;

use crate::analysis::blueprint::RoleBlueprint;
use crate::analysis::AnalysisPolicy;
use crate::models::analysis::{
    ActionableTip, AnalysisResult, CriticalGap, ReadinessLevel, ResumeFeedback, RoadmapPhase,
    Skill,
};

const GAP_REASON: &str = "Required for this role but not found.";
const GAP_SOURCE: &str = "Docs";
const LEARNING_SEARCH_URL: &str = "https://google.com/search";
const FOUND_SKILL_SCORE: u32 = 100;
const ROADMAP_TITLE: &str = "Phase 1: Immediate Gaps";
const ROADMAP_DURATION: &str = "2 Weeks";
const ROADMAP_MAX_TASKS: usize = 3;
const MAX_STRENGTHS: usize = 3;
const FEEDBACK_SUMMARY: &str = "Analysis based on extracted text.";
const TERMINOLOGY_TIP: &str = "Ensure keywords match standard terminology.";

pub struct GapAnalyzer<'a> {
    policy: &'a AnalysisPolicy,
}

impl<'a> GapAnalyzer<'a> {
    pub fn new(policy: &'a AnalysisPolicy) -> Self {
        Self { policy }
    }

    /// Builds the full static result. Without a blueprint this is plain
    /// extraction: no missing skills, no gaps, score 0.
    pub fn analyze(&self, extracted: Vec<Skill>, blueprint: Option<&RoleBlueprint>) -> AnalysisResult {
        let extracted: Vec<Skill> = extracted
            .into_iter()
            .map(|skill| Skill {
                score: FOUND_SKILL_SCORE,
                ..skill
            })
            .collect();
        let found: HashSet<&str> = extracted.iter().map(|s| s.name.as_str()).collect();

        let (missing, critical_gaps) = match blueprint {
            Some(blueprint) => check_gaps(blueprint, &found),
            None => (Vec::new(), Vec::new()),
        };

        let overall_score = blueprint
            .map(|b| self.score(b, &found))
            .unwrap_or(0);

        let roadmap = build_roadmap(&critical_gaps);

        let gap_summary = if critical_gaps.is_empty() {
            "Great match!".to_string()
        } else {
            format!("Missing critical skills: {}", critical_gaps.len())
        };

        let resume_feedback = ResumeFeedback {
            score: overall_score,
            strengths: extracted
                .iter()
                .take(MAX_STRENGTHS)
                .map(|s| s.name.clone())
                .collect(),
            summary: FEEDBACK_SUMMARY.to_string(),
            missing_keywords: missing.iter().map(|s| s.name.clone()).collect(),
            actionable_feedback: vec![ActionableTip {
                tip_type: "content".to_string(),
                tip: TERMINOLOGY_TIP.to_string(),
            }],
        };

        let skill_scores: BTreeMap<String, u32> = extracted
            .iter()
            .map(|s| (s.name.clone(), s.score))
            .collect();

        AnalysisResult {
            extracted,
            missing,
            critical_gaps,
            roadmap,
            resume_feedback: Some(resume_feedback),
            readiness_level: Some(ReadinessLevel::from_score(overall_score)),
            gap_summary: Some(gap_summary),
            overall_score,
            skill_scores,
            ai_error: None,
        }
    }

    /// round(found / required * 100), clamped to 100, raised to the policy
    /// floor when any required skill was found. Zero when nothing is required.
    pub fn score(&self, blueprint: &RoleBlueprint, found: &HashSet<&str>) -> u32 {
        let total_required = blueprint.total_required();
        if total_required == 0 {
            return 0;
        }

        let required_found = found.iter().filter(|name| blueprint.requires(name)).count();

        let raw = (required_found as f64 / total_required as f64 * 100.0).round() as u32;
        let score = raw.min(100);

        if required_found > 0 && score < self.policy.score_floor {
            self.policy.score_floor.min(100)
        } else {
            score
        }
    }
}

/// One missing-skill record and one critical gap per required skill absent
/// from `found`. A skill required in several categories is reported once.
fn check_gaps(blueprint: &RoleBlueprint, found: &HashSet<&str>) -> (Vec<Skill>, Vec<CriticalGap>) {
    let mut reported: HashSet<&str> = HashSet::new();
    let mut missing = Vec::new();
    let mut gaps = Vec::new();

    for (category, required) in blueprint.categories() {
        for name in required {
            if found.contains(name.as_str()) || !reported.insert(name.as_str()) {
                continue;
            }
            missing.push(Skill::missing(name, category));
            gaps.push(critical_gap(name));
        }
    }

    (missing, gaps)
}

fn critical_gap(skill: &str) -> CriticalGap {
    CriticalGap {
        skill: skill.to_string(),
        reason: GAP_REASON.to_string(),
        learning_url: learning_url(skill),
        source_name: GAP_SOURCE.to_string(),
    }
}

fn learning_url(skill: &str) -> String {
    Url::parse_with_params(LEARNING_SEARCH_URL, &[("q", skill)])
        .map(String::from)
        .unwrap_or_else(|_| format!("{LEARNING_SEARCH_URL}?q={skill}"))
}

fn build_roadmap(gaps: &[CriticalGap]) -> Vec<RoadmapPhase> {
    if gaps.is_empty() {
        return Vec::new();
    }
    vec![RoadmapPhase {
        title: ROADMAP_TITLE.to_string(),
        duration: ROADMAP_DURATION.to_string(),
        tasks: gaps
            .iter()
            .take(ROADMAP_MAX_TASKS)
            .map(|g| format!("Learn {}", g.skill))
            .collect(),
    }]
}
