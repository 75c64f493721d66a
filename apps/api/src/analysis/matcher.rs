use std::collections::HashSet;

use crate::analysis::blueprint::SkillDefinition;
use crate::models::analysis::Skill;

/// Deterministic keyword matcher over the taxonomy.
///
/// A skill is found when any of its keywords is a substring of the
/// lower-cased text. No stemming, no frequency weighting. Output follows
/// taxonomy declaration order and lists each skill name once.
pub struct KeywordSkillMatcher<'a> {
    skills: &'a [SkillDefinition],
}

impl<'a> KeywordSkillMatcher<'a> {
    pub fn new(skills: &'a [SkillDefinition]) -> Self {
        Self { skills }
    }

    /// Found skills carry score 0 here; the gap analyzer assigns scores.
    pub fn extract(&self, text: &str) -> Vec<Skill> {
        let text_lower = text.to_lowercase();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut found = Vec::new();

        for skill in self.skills {
            if seen.contains(skill.name.as_str()) {
                continue;
            }
            let hit = skill
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .any(|k| !k.is_empty() && text_lower.contains(&k));
            if hit {
                seen.insert(skill.name.as_str());
                found.push(Skill::found(&skill.name, skill.category, 0));
            }
        }

        found
    }
}
