use serde::{Deserialize, Serialize};

/// Our question IDs are client-chosen strings, unique within their survey.
pub type QuestionId = String;

/// The kinds of question a survey can ask.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionType {
    /// Free text answer.
    Text,
    /// Pick one of the declared options.
    MultipleChoice,
}

/// A single, validated survey question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique ID within the survey.
    pub id: QuestionId,
    /// Question kind.
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// Question text.
    #[serde(default)]
    pub question: String,
    /// Possible answers; always empty for text questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Question {
    /// Is the given string one of this question's declared options?
    pub fn has_option(&self, candidate: &str) -> bool {
        self.options.iter().any(|option| option == candidate)
    }
}
