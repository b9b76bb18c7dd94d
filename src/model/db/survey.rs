use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, serde_helpers::chrono_datetime_as_bson_datetime, to_bson, Document};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{common::Question, mongodb::Id};

/// Core survey data, as stored in the database.
///
/// Every field but the creation time has a default, so documents written by
/// older or foreign clients still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyCore {
    /// Survey title.
    #[serde(default)]
    pub title: String,
    /// Survey description.
    #[serde(default)]
    pub description: String,
    /// Questions, in display order.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Email of the owning account.
    #[serde(default)]
    pub created_by: String,
    /// Creation time.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl SurveyCore {
    /// Is the given account email the owner of this survey?
    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.created_by == owner
    }

    /// Look up a question by its ID.
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

/// A survey without an ID.
pub type NewSurvey = SurveyCore;

/// A survey from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub survey: SurveyCore,
}

impl Deref for Survey {
    type Target = SurveyCore;

    fn deref(&self) -> &Self::Target {
        &self.survey
    }
}

impl DerefMut for Survey {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.survey
    }
}

/// A validated partial update to a survey's owner-editable fields.
/// Ownership and creation time are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub questions: Option<Vec<Question>>,
}

impl SurveyPatch {
    /// Does this patch change nothing?
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.questions.is_none()
    }

    /// Apply the patch to an in-memory survey.
    pub fn apply(self, survey: &mut SurveyCore) {
        if let Some(title) = self.title {
            survey.title = title;
        }
        if let Some(description) = self.description {
            survey.description = description;
        }
        if let Some(questions) = self.questions {
            survey.questions = questions;
        }
    }

    /// The `$set` document for this patch.
    pub fn to_set_doc(&self) -> Result<Document> {
        let mut set = Document::new();
        if let Some(ref title) = self.title {
            set.insert("title", title);
        }
        if let Some(ref description) = self.description {
            set.insert("description", description);
        }
        if let Some(ref questions) = self.questions {
            set.insert("questions", to_bson(questions)?);
        }
        Ok(doc! { "$set": set })
    }
}
