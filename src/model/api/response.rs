use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    api::id::ApiId,
    common::Answer,
    db::{
        response::{NewResponse, Response},
        survey::Survey,
    },
};

const MISSING_FIELDS: &str = "Missing required fields: surveyId, answers";

/// A response submission from a respondent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSubmission {
    #[serde(default)]
    pub survey_id: Option<String>,
    #[serde(default)]
    pub answers: Option<Vec<Answer>>,
    #[serde(default)]
    pub respondent_email: Option<String>,
}

impl ResponseSubmission {
    /// The target survey ID, or a validation error if it is missing or the
    /// answer list is absent or empty.
    pub fn required_survey_id(&self) -> Result<&str> {
        let survey_id = self
            .survey_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        match (survey_id, self.answers.as_ref()) {
            (Some(survey_id), Some(answers)) if !answers.is_empty() => Ok(survey_id),
            _ => Err(Error::bad_request(MISSING_FIELDS)),
        }
    }

    /// Check the answers against the target survey and build the response.
    ///
    /// Every answered question must belong to the survey and be answered at
    /// most once. Unanswered questions are allowed, and answer shapes are not
    /// checked against question types.
    pub fn into_response(self, survey: &Survey) -> Result<NewResponse> {
        let answers = match self.answers {
            Some(answers) if !answers.is_empty() => answers,
            _ => return Err(Error::bad_request(MISSING_FIELDS)),
        };

        let mut answered = HashSet::new();
        for answer in answers.iter() {
            if survey.question(&answer.question_id).is_none() {
                return Err(Error::bad_request(format!(
                    "Question '{}' is not part of survey {}",
                    answer.question_id, survey.id
                )));
            }
            if !answered.insert(answer.question_id.as_str()) {
                return Err(Error::bad_request(format!(
                    "Question '{}' answered more than once",
                    answer.question_id
                )));
            }
        }

        let respondent_email = self
            .respondent_email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());

        Ok(NewResponse::new(survey.id, answers, respondent_email))
    }
}

/// An API-friendly response description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDescription {
    pub id: ApiId,
    pub survey_id: ApiId,
    pub answers: Vec<Answer>,
    pub respondent_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Response> for ResponseDescription {
    fn from(response: Response) -> Self {
        Self {
            id: response.id.into(),
            survey_id: response.response.survey_id.into(),
            answers: response.response.answers,
            respondent_email: response.response.respondent_email,
            created_at: response.response.created_at,
        }
    }
}
