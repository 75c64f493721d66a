//! Role blueprint store: the skill taxonomy and per-role requirements,
//! loaded once at startup and read-only afterwards.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::models::analysis::SkillCategory;

/// A taxonomy skill: display name, category and the keywords that detect it.
#[derive(Debug, Clone, Deserialize)]
pub struct SkillDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub category: SkillCategory,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Required skill names per category for one role.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoleBlueprint {
    #[serde(skip)]
    pub key: String,
    pub tech: Vec<String>,
    pub soft: Vec<String>,
    pub prof: Vec<String>,
}

impl RoleBlueprint {
    /// Each required list tagged with its category, in reporting order.
    pub fn categories(&self) -> [(SkillCategory, &[String]); 3] {
        [
            (SkillCategory::Technical, self.tech.as_slice()),
            (SkillCategory::Soft, self.soft.as_slice()),
            (SkillCategory::Professional, self.prof.as_slice()),
        ]
    }

    pub fn total_required(&self) -> usize {
        self.tech.len() + self.soft.len() + self.prof.len()
    }

    pub fn requires(&self, skill: &str) -> bool {
        self.categories()
            .iter()
            .any(|(_, list)| list.iter().any(|s| s == skill))
    }

    /// Human-readable description handed to the model.
    pub fn render_for_prompt(&self) -> String {
        format!(
            "   - Technical: {}\n   - Soft: {}\n   - Professional: {}",
            json_list(&self.tech),
            json_list(&self.soft),
            json_list(&self.prof)
        )
    }
}

fn json_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    #[serde(default)]
    skills: Vec<SkillDefinition>,
    #[serde(default)]
    roles: serde_json::Map<String, serde_json::Value>,
}

/// Immutable taxonomy + blueprints. Shared across requests behind an `Arc`.
#[derive(Debug, Default)]
pub struct RoleBlueprintStore {
    skills: Vec<SkillDefinition>,
    /// Declaration order matters: fuzzy lookup returns the first hit.
    roles: Vec<RoleBlueprint>,
    index: HashMap<String, usize>,
}

impl RoleBlueprintStore {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read skill taxonomy '{}'", path.display()))?;
        let store = Self::from_json(&raw)
            .with_context(|| format!("Invalid skill taxonomy '{}'", path.display()))?;
        info!(
            "Loaded skill taxonomy: {} skills, {} roles",
            store.skills.len(),
            store.roles.len()
        );
        Ok(store)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: TaxonomyFile = serde_json::from_str(raw)?;

        let roles = file
            .roles
            .into_iter()
            .map(|(key, value)| {
                let blueprint: RoleBlueprint = serde_json::from_value(value)
                    .with_context(|| format!("Role '{key}' is malformed"))?;
                Ok(RoleBlueprint { key, ..blueprint })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(file.skills, roles))
    }

    pub fn new(skills: Vec<SkillDefinition>, roles: Vec<RoleBlueprint>) -> Self {
        let mut index = HashMap::with_capacity(roles.len());
        for (position, role) in roles.iter().enumerate() {
            index.entry(role.key.clone()).or_insert(position);
        }
        Self {
            skills,
            roles,
            index,
        }
    }

    pub fn skills(&self) -> &[SkillDefinition] {
        &self.skills
    }

    /// Resolves a free-form role name to a blueprint.
    ///
    /// Exact key match on the normalized input first, then the first declared
    /// role whose normalized key contains the input or is contained by it.
    /// Input that normalizes to nothing is contained in every key and so
    /// resolves to the first declared role.
    /// `None` means "blueprint unknown", which callers treat as dynamic mode.
    pub fn get_role_definition(&self, role_id: &str) -> Option<&RoleBlueprint> {
        let normalized = normalize_role(role_id);

        if let Some(&position) = self.index.get(&normalized) {
            return self.roles.get(position);
        }

        self.roles.iter().find(|role| {
            let key = normalize_role(&role.key);
            normalized.contains(&key) || key.contains(&normalized)
        })
    }
}

/// Lower-cases and strips spaces and hyphens.
fn normalize_role(role: &str) -> String {
    role.trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect()
}
