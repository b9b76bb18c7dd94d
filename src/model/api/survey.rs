use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    api::id::ApiId,
    common::{Question, QuestionId, QuestionType},
    db::survey::{NewSurvey, Survey, SurveyPatch},
    mongodb::Id,
};

const MISSING_FIELDS: &str = "Missing required fields: title, description, questions";

/// A survey specification, as submitted by its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveySpec {
    /// Survey title.
    #[serde(default)]
    pub title: String,
    /// Survey description.
    #[serde(default)]
    pub description: String,
    /// Question specifications, in display order.
    #[serde(default)]
    pub questions: Vec<QuestionSpec>,
}

impl SurveySpec {
    /// Validate this spec and turn it into a survey owned by `owner`.
    pub fn into_survey(self, owner: &str) -> Result<NewSurvey> {
        let title = required_text(&self.title).ok_or_else(|| Error::bad_request(MISSING_FIELDS))?;
        let description =
            required_text(&self.description).ok_or_else(|| Error::bad_request(MISSING_FIELDS))?;
        if self.questions.is_empty() {
            return Err(Error::bad_request(MISSING_FIELDS));
        }
        let questions = into_questions(self.questions)?;

        Ok(NewSurvey {
            title,
            description,
            questions,
            created_by: owner.to_string(),
            created_at: Utc::now(),
        })
    }
}

/// A partial survey specification, used to modify an existing survey.
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyUpdateSpec {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Option<Vec<QuestionSpec>>,
}

impl TryFrom<SurveyUpdateSpec> for SurveyPatch {
    type Error = Error;

    /// Apply the creation rules to every field that is present.
    fn try_from(spec: SurveyUpdateSpec) -> Result<Self> {
        let title = spec
            .title
            .map(|title| {
                required_text(&title).ok_or_else(|| Error::bad_request("Title cannot be empty"))
            })
            .transpose()?;
        let description = spec
            .description
            .map(|description| {
                required_text(&description)
                    .ok_or_else(|| Error::bad_request("Description cannot be empty"))
            })
            .transpose()?;
        let questions = spec
            .questions
            .map(|questions| {
                if questions.is_empty() {
                    Err(Error::bad_request("A survey needs at least one question"))
                } else {
                    into_questions(questions)
                }
            })
            .transpose()?;

        Ok(Self {
            title,
            description,
            questions,
        })
    }
}

/// A question specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSpec {
    /// Client-chosen ID; generated if absent or blank.
    #[serde(default)]
    pub id: Option<QuestionId>,
    /// Question kind.
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// Question text.
    #[serde(default)]
    pub question: String,
    /// Possible answers, only meaningful for multiple choice.
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl QuestionSpec {
    /// Validate and normalise this spec into a question.
    pub fn into_question(self) -> Result<Question> {
        let text = required_text(&self.question)
            .ok_or_else(|| Error::bad_request("Every question needs non-empty text"))?;
        let id = self
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Id::new().to_string());

        let options = match self.kind {
            QuestionType::Text => Vec::new(),
            QuestionType::MultipleChoice => {
                let options: Vec<String> = self
                    .options
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|option| required_text(option))
                    .collect();
                if options.is_empty() {
                    return Err(Error::bad_request(format!(
                        "Multiple choice question '{text}' needs at least one non-empty option"
                    )));
                }
                let mut seen = HashSet::new();
                if let Some(duplicate) =
                    options.iter().find(|option| !seen.insert(option.as_str()))
                {
                    return Err(Error::bad_request(format!(
                        "Duplicate option '{duplicate}' in question '{text}'"
                    )));
                }
                options
            }
        };

        Ok(Question {
            id,
            kind: self.kind,
            question: text,
            options,
        })
    }
}

/// Validate a list of question specs, rejecting duplicate IDs.
fn into_questions(specs: Vec<QuestionSpec>) -> Result<Vec<Question>> {
    let questions = specs
        .into_iter()
        .map(QuestionSpec::into_question)
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for question in questions.iter() {
        if !seen.insert(question.id.as_str()) {
            return Err(Error::bad_request(format!(
                "Duplicate question ID '{}'",
                question.id
            )));
        }
    }

    Ok(questions)
}

/// Trim, returning `None` if nothing is left.
fn required_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// An API-friendly survey description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDescription {
    /// Survey unique ID.
    pub id: ApiId,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    /// Email of the owning account.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<Survey> for SurveyDescription {
    fn from(survey: Survey) -> Self {
        Self {
            id: survey.id.into(),
            title: survey.survey.title,
            description: survey.survey.description,
            questions: survey.survey.questions,
            created_by: survey.survey.created_by,
            created_at: survey.survey.created_at,
        }
    }
}

/// A survey alongside how many responses it has, for the owner's dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyOverview {
    #[serde(flatten)]
    pub survey: SurveyDescription,
    pub response_count: u64,
}
