//! The persistence client: every read and write the services perform.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};

use crate::error::{Error, Result};
use crate::model::{
    db::{
        account::{Account, NewAccount},
        response::{NewResponse, Response},
        survey::{NewSurvey, Survey, SurveyPatch},
    },
    mongodb::Id,
};

/// The store as placed in managed state.
pub type DynStore = Box<dyn Store>;

/// Document storage for surveys, responses, and accounts.
///
/// Listings are ordered newest first, ties broken by ID (newest first).
#[rocket::async_trait]
pub trait Store: Send + Sync {
    /// Insert a survey, returning it with its new ID.
    async fn insert_survey(&self, survey: NewSurvey) -> Result<Survey>;

    async fn find_survey(&self, id: Id) -> Result<Option<Survey>>;

    /// All surveys created by the given owner.
    async fn find_surveys_by_owner(&self, owner: &str) -> Result<Vec<Survey>>;

    /// Apply the patch, returning the updated survey, or `None` if it doesn't exist.
    async fn update_survey(&self, id: Id, patch: SurveyPatch) -> Result<Option<Survey>>;

    /// Delete a survey together with all its responses.
    /// Returns whether the survey existed.
    async fn delete_survey(&self, id: Id) -> Result<bool>;

    /// Insert a response, returning it with its new ID.
    async fn insert_response(&self, response: NewResponse) -> Result<Response>;

    async fn find_responses_by_survey(&self, survey_id: Id) -> Result<Vec<Response>>;

    async fn count_responses_by_survey(&self, survey_id: Id) -> Result<u64>;

    /// Insert an account, returning `None` if the email is already registered.
    async fn insert_account(&self, account: NewAccount) -> Result<Option<Account>>;

    async fn find_account(&self, id: Id) -> Result<Option<Account>>;

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for &'r dyn Store {
    type Error = Error;

    /// Borrow the store from managed state.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.rocket().state::<DynStore>() {
            Some(store) => Outcome::Success(store.as_ref()),
            None => Outcome::Failure((
                Status::InternalServerError,
                Error::internal("Store is not managed"),
            )),
        }
    }
}
