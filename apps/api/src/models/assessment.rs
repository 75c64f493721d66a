use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentRequest {
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssessmentResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    pub questions: Vec<Question>,
}

/// A single generated question. `question_type` is "MCQ" or "CODING".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub skill: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub question: String,
    pub code_snippet: Option<String>,
    /// Four options for MCQ, empty for CODING.
    pub options: Vec<String>,
    pub correct_answer_index: Option<u32>,
}
