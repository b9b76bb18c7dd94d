use std::collections::HashMap;

use rocket::tokio::sync::RwLock;

use crate::error::Result;
use crate::model::{
    db::{
        account::{Account, NewAccount},
        response::{NewResponse, Response},
        survey::{NewSurvey, Survey, SurveyPatch},
    },
    mongodb::Id,
};

/// An in-process [`Store`](super::Store), for local development and tests.
#[derive(Default)]
pub struct MemoryStore {
    surveys: RwLock<HashMap<Id, Survey>>,
    responses: RwLock<HashMap<Id, Response>>,
    accounts: RwLock<HashMap<Id, Account>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sort newest first, ties broken by ID.
fn sort_newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> (chrono::DateTime<chrono::Utc>, Id),
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[rocket::async_trait]
impl super::Store for MemoryStore {
    async fn insert_survey(&self, survey: NewSurvey) -> Result<Survey> {
        let survey = Survey {
            id: Id::new(),
            survey,
        };
        self.surveys.write().await.insert(survey.id, survey.clone());
        Ok(survey)
    }

    async fn find_survey(&self, id: Id) -> Result<Option<Survey>> {
        Ok(self.surveys.read().await.get(&id).cloned())
    }

    async fn find_surveys_by_owner(&self, owner: &str) -> Result<Vec<Survey>> {
        let mut surveys: Vec<Survey> = self
            .surveys
            .read()
            .await
            .values()
            .filter(|s| s.is_owned_by(owner))
            .cloned()
            .collect();
        sort_newest_first(&mut surveys, |s| (s.created_at, s.id));
        Ok(surveys)
    }

    async fn update_survey(&self, id: Id, patch: SurveyPatch) -> Result<Option<Survey>> {
        let mut surveys = self.surveys.write().await;
        Ok(surveys.get_mut(&id).map(|survey| {
            patch.apply(survey);
            survey.clone()
        }))
    }

    async fn delete_survey(&self, id: Id) -> Result<bool> {
        // Hold both locks so no response can slip in for a vanishing survey.
        let mut surveys = self.surveys.write().await;
        let mut responses = self.responses.write().await;
        if surveys.remove(&id).is_none() {
            return Ok(false);
        }
        responses.retain(|_, r| r.survey_id != id);
        Ok(true)
    }

    async fn insert_response(&self, response: NewResponse) -> Result<Response> {
        let response = Response {
            id: Id::new(),
            response,
        };
        self.responses
            .write()
            .await
            .insert(response.id, response.clone());
        Ok(response)
    }

    async fn find_responses_by_survey(&self, survey_id: Id) -> Result<Vec<Response>> {
        let mut responses: Vec<Response> = self
            .responses
            .read()
            .await
            .values()
            .filter(|r| r.survey_id == survey_id)
            .cloned()
            .collect();
        sort_newest_first(&mut responses, |r| (r.created_at, r.id));
        Ok(responses)
    }

    async fn count_responses_by_survey(&self, survey_id: Id) -> Result<u64> {
        let count = self
            .responses
            .read()
            .await
            .values()
            .filter(|r| r.survey_id == survey_id)
            .count();
        Ok(count as u64)
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Option<Account>> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Ok(None);
        }
        let account = Account {
            id: Id::new(),
            account,
        };
        accounts.insert(account.id, account.clone());
        Ok(Some(account))
    }

    async fn find_account(&self, id: Id) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }
}
