use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{common::Answer, mongodb::Id};

/// Core response data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseCore {
    /// The survey this responds to. Not enforced as a foreign key by the store.
    pub survey_id: Id,
    /// The respondent's answers.
    #[serde(default)]
    pub answers: Vec<Answer>,
    /// Set only for identified respondents.
    #[serde(default)]
    pub respondent_email: Option<String>,
    /// Submission time.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl ResponseCore {
    /// Create a new response, timestamped now.
    pub fn new(survey_id: Id, answers: Vec<Answer>, respondent_email: Option<String>) -> Self {
        Self {
            survey_id,
            answers,
            respondent_email,
            created_at: Utc::now(),
        }
    }

    /// Find the answer to the given question, if there is one.
    pub fn answer_to(&self, question_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }
}

/// A response without an ID.
pub type NewResponse = ResponseCore;

/// A response from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub response: ResponseCore,
}

impl Deref for Response {
    type Target = ResponseCore;

    fn deref(&self) -> &Self::Target {
        &self.response
    }
}

impl DerefMut for Response {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.response
    }
}
