use serde::{Deserialize, Serialize};

use super::question::QuestionId;

/// One answer within a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// The question being answered.
    pub question_id: QuestionId,
    /// The answer itself.
    pub answer: AnswerValue,
}

/// An answer is either a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Multiple(Vec<String>),
}

impl AnswerValue {
    /// Every string picked, in the order given.
    pub fn picked(&self) -> &[String] {
        match self {
            Self::Single(answer) => std::slice::from_ref(answer),
            Self::Multiple(answers) => answers,
        }
    }

    /// Render the answer as display text.
    pub fn to_text(&self) -> String {
        match self {
            Self::Single(answer) => answer.clone(),
            Self::Multiple(answers) => answers.join(", "),
        }
    }
}
