// Prompt constants for skill assessment generation.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

pub const QUESTIONS_PER_SKILL: u32 = 4;
pub const ASSESSMENT_DIFFICULTY: &str = "Intermediate to Advanced";

/// Assessment prompt.
/// Replace: {skills}, {level}, {language}, {count}, {seed}, {json_only}
pub const ASSESSMENT_PROMPT_TEMPLATE: &str = r#"You are an expert Technical Interviewer & Assessment Generator.

OBJECTIVE:
Generate a personalized, high-quality technical assessment for the following candidate skills:
{skills}

STRICT REQUIREMENTS:
1. NO REPETITION: Questions must be unique. Do NOT use generic "What is X?" questions.
2. CORE TOPICS ONLY: Focus on the most important concepts for each skill.
3. MIX OF TYPES:
   - MCQ: Multiple Choice Questions (theoretical or code analysis).
   - CODING: Short coding challenges where the user must write or fix code.
4. INCLUDE CODE: At least half of the questions must involve a code snippet.
5. DIFFICULTY: {level}.
6. LANGUAGE: Output every question and option in {language}.

OUTPUT FORMAT:
{
  "difficulty": "{level}",
  "questions": [
    {
      "id": "q1",
      "skill": "Exact Skill Name",
      "type": "MCQ",
      "question": "The question text or problem statement",
      "codeSnippet": "Code to analyze (MCQ) or starter code (CODING), or null",
      "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
      "correctAnswerIndex": 0
    }
  ]
}
"options" holds exactly four entries for MCQ and is empty for CODING.
"correctAnswerIndex" is 0-3 for MCQ and null for CODING.

CONFIGURATION:
- Count: {count} questions per skill (mix of MCQ and CODING).
- Seed: {seed}

{json_only}"#;

pub fn assessment_prompt(skills: &[String], language: &str, seed: &str) -> String {
    ASSESSMENT_PROMPT_TEMPLATE
        .replace("{skills}", &skills.join(", "))
        .replace("{level}", ASSESSMENT_DIFFICULTY)
        .replace("{language}", language)
        .replace("{count}", &QUESTIONS_PER_SKILL.to_string())
        .replace("{seed}", seed)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
}
