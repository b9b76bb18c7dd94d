use mongodb::{
    bson::{doc, Document},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Client, Database,
};
use rocket::futures::TryStreamExt;

use crate::error::{Error, Result};
use crate::model::{
    db::{
        account::{Account, NewAccount},
        response::{NewResponse, Response},
        survey::{NewSurvey, Survey, SurveyPatch},
    },
    mongodb::{is_duplicate_key_error, Coll, Id},
};

/// A [`Store`](super::Store) backed by MongoDB.
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub fn new(client: Client, db: Database) -> Self {
        Self { client, db }
    }

    fn surveys(&self) -> Coll<Survey> {
        Coll::from_db(&self.db)
    }

    fn responses(&self) -> Coll<Response> {
        Coll::from_db(&self.db)
    }

    fn accounts(&self) -> Coll<Account> {
        Coll::from_db(&self.db)
    }
}

/// Newest first, ties broken by ID.
fn newest_first() -> FindOptions {
    FindOptions::builder()
        .sort(doc! {"createdAt": -1, "_id": -1})
        .build()
}

/// Extract the ID MongoDB assigned to an inserted document.
fn inserted_id(result: mongodb::results::InsertOneResult) -> Result<Id> {
    result
        .inserted_id
        .as_object_id()
        .map(Id::from)
        .ok_or_else(|| Error::internal("Database returned a non-ObjectId document ID"))
}

#[rocket::async_trait]
impl super::Store for MongoStore {
    async fn insert_survey(&self, survey: NewSurvey) -> Result<Survey> {
        let result = Coll::<NewSurvey>::from_db(&self.db)
            .insert_one(&survey, None)
            .await?;
        let id = inserted_id(result)?;
        Ok(Survey { id, survey })
    }

    async fn find_survey(&self, id: Id) -> Result<Option<Survey>> {
        Ok(self.surveys().find_one(id.as_doc(), None).await?)
    }

    async fn find_surveys_by_owner(&self, owner: &str) -> Result<Vec<Survey>> {
        let filter = doc! {
            "createdBy": owner,
        };
        let surveys = self
            .surveys()
            .find(filter, newest_first())
            .await?
            .try_collect()
            .await?;
        Ok(surveys)
    }

    async fn update_survey(&self, id: Id, patch: SurveyPatch) -> Result<Option<Survey>> {
        // MongoDB rejects an empty `$set`.
        if patch.is_empty() {
            return self.find_survey(id).await;
        }
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .surveys()
            .find_one_and_update(id.as_doc(), patch.to_set_doc()?, options)
            .await?;
        Ok(updated)
    }

    async fn delete_survey(&self, id: Id) -> Result<bool> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        // Delete the survey itself.
        let result = self
            .surveys()
            .delete_one_with_session(id.as_doc(), None, &mut session)
            .await?;
        if result.deleted_count == 0 {
            session.abort_transaction().await?;
            return Ok(false);
        }

        // Delete all its responses.
        let filter = doc! {
            "surveyId": id,
        };
        let removed = self
            .responses()
            .delete_many_with_session(filter, None, &mut session)
            .await?;

        session.commit_transaction().await?;
        debug!(
            "Deleted survey {id} and {} responses",
            removed.deleted_count
        );
        Ok(true)
    }

    async fn insert_response(&self, response: NewResponse) -> Result<Response> {
        let result = Coll::<NewResponse>::from_db(&self.db)
            .insert_one(&response, None)
            .await?;
        let id = inserted_id(result)?;
        Ok(Response { id, response })
    }

    async fn find_responses_by_survey(&self, survey_id: Id) -> Result<Vec<Response>> {
        let responses = self
            .responses()
            .find(survey_filter(survey_id), newest_first())
            .await?
            .try_collect()
            .await?;
        Ok(responses)
    }

    async fn count_responses_by_survey(&self, survey_id: Id) -> Result<u64> {
        Ok(self
            .responses()
            .count_documents(survey_filter(survey_id), None)
            .await?)
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Option<Account>> {
        match Coll::<NewAccount>::from_db(&self.db)
            .insert_one(&account, None)
            .await
        {
            Ok(result) => {
                let id = inserted_id(result)?;
                Ok(Some(Account { id, account }))
            }
            // The unique email index rejected it.
            Err(e) if is_duplicate_key_error(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_account(&self, id: Id) -> Result<Option<Account>> {
        Ok(self.accounts().find_one(id.as_doc(), None).await?)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let filter = doc! {
            "email": email,
        };
        Ok(self.accounts().find_one(filter, None).await?)
    }
}

fn survey_filter(survey_id: Id) -> Document {
    doc! {
        "surveyId": survey_id,
    }
}
