// Prompt constants for resume analysis.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Substituted for the blueprint description when the role is unknown.
pub const DYNAMIC_MODE_DIRECTIVE: &str = "   [DYNAMIC MODE] Strict Blueprint not found in database. \
    Please infer industry standards for this role.";

/// Resume analysis prompt.
/// Replace: {role}, {blueprint}, {seed}, {json_only}, {resume_text}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are a Domain-Based Skill Gap Analysis Engine.

Inputs:
1. Resume text (raw text extracted from the uploaded resume)
2. Selected domain: "{role}"
3. Domain skill blueprint containing ONLY the selected domain's requirements:
{blueprint}

STRICT RULES (MANDATORY):
- Do NOT use any fake default skills.
- If a Blueprint is provided (listed above), compare STRICTLY against it.
- If the Blueprint is marked [DYNAMIC MODE], you MUST:
   1. GENERATE a high-standard, modern skill list for the domain "{role}".
   2. Compare the resume against this generated list.
   3. "missingSkills" must ONLY contain skills that are CRITICAL for "{role}" and completely ABSENT from the resume.
   4. Do NOT list generic skills like "Communication" or "Teamwork" as missing. Focus on HARD SKILLS first.
- Infer soft skills ONLY if there is clear evidence in the resume.
- If the domain is unknown or random text, return no missing skills.
- All decisions must be explainable.

PROCESS:
1. Parse the resume text.
2. Extract skills.
3. Use the provided blueprint, or generate standard requirements for "{role}".
4. Perform gap analysis (matched vs missing).
5. Build the result.

OUTPUT FORMAT:
{
  "domain": "{role}",
  "overallScore": 80,
  "matchedSkills": {"technical": ["Skill1"], "soft": ["Communication"], "nonTechnical": []},
  "skillScores": {"Skill1": 85, "Communication": 90},
  "missingSkills": {"technical": ["MissingCriticalSkill"], "soft": [], "nonTechnical": []},
  "extraSkills": ["ExtraSkill"],
  "criticalGaps": [
    {"skill": "Skill Name", "reason": "Why it is critical", "learningUrl": "https://google.com/search?q=learn+Skill", "sourceName": "Google"}
  ],
  "roadmap": [{"title": "Phase 1: Basics", "duration": "2 Weeks", "tasks": ["Learn X"]}],
  "resumeFeedback": {
    "score": 70,
    "strengths": ["Strength"],
    "summary": "Summary",
    "missingKeywords": ["Keyword"],
    "actionableFeedback": [{"type": "content", "tip": "Tip"}]
  },
  "readinessLevel": "Junior | Mid-Level | Senior",
  "gapSummary": "Summary string"
}
overallScore and every skillScores value are integers from 0 to 100.

{json_only}

Seed: {seed}

INPUT RESUME:
{resume_text}"#;

pub fn analysis_prompt(role: &str, blueprint: &str, seed: &str, resume_text: &str) -> String {
    // Resume text is substituted last; its content is never scanned for placeholders.
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{blueprint}", blueprint)
        .replace("{seed}", seed)
        .replace("{role}", role)
        .replace("{resume_text}", resume_text)
}
