use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{api::id::ApiId, common::QuestionId};

/// Aggregated results for a whole survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResults {
    pub survey_id: ApiId,
    pub title: String,
    /// Number of responses the results were computed from.
    pub total_responses: u64,
    /// Submission time of the newest response, if there are any.
    pub latest_response_at: Option<DateTime<Utc>>,
    /// Per-question results, in survey order.
    pub questions: Vec<QuestionResults>,
}

/// Results for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum QuestionResults {
    /// Every raw answer, in response order.
    #[serde(rename_all = "camelCase")]
    Text {
        question_id: QuestionId,
        question: String,
        answers: Vec<String>,
    },
    /// A tally per declared option, in declaration order.
    #[serde(rename_all = "camelCase")]
    MultipleChoice {
        question_id: QuestionId,
        question: String,
        options: Vec<OptionTally>,
    },
}

/// How many responses picked a given option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionTally {
    pub option: String,
    pub count: u64,
    /// Rounded share of all responses, 0 when there are none.
    pub percentage: u32,
}
