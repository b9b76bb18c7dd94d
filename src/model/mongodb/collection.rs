use std::ops::Deref;

use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};

use crate::model::db::{
    account::{Account, NewAccount},
    response::{NewResponse, Response},
    survey::{NewSurvey, Survey},
};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Survey collections
const SURVEYS: &str = "surveys";
impl MongoCollection for Survey {
    const NAME: &'static str = SURVEYS;
}
impl MongoCollection for NewSurvey {
    const NAME: &'static str = SURVEYS;
}

// Response collections
const RESPONSES: &str = "responses";
impl MongoCollection for Response {
    const NAME: &'static str = RESPONSES;
}
impl MongoCollection for NewResponse {
    const NAME: &'static str = RESPONSES;
}

// Account collections
const ACCOUNTS: &str = "accounts";
impl MongoCollection for Account {
    const NAME: &'static str = ACCOUNTS;
}
impl MongoCollection for NewAccount {
    const NAME: &'static str = ACCOUNTS;
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    // Surveys are listed per owner, newest first.
    let survey_index = IndexModel::builder()
        .keys(doc! {"createdBy": 1, "createdAt": -1})
        .build();
    Coll::<Survey>::from_db(db)
        .create_index(survey_index, None)
        .await?;

    // Responses are listed and counted per survey, newest first.
    let response_index = IndexModel::builder()
        .keys(doc! {"surveyId": 1, "createdAt": -1})
        .build();
    Coll::<Response>::from_db(db)
        .create_index(response_index, None)
        .await?;

    // Account collection.
    let unique = IndexOptions::builder().unique(true).build();
    let account_index = IndexModel::builder()
        .keys(doc! {"email": 1})
        .options(unique)
        .build();
    Coll::<Account>::from_db(db)
        .create_index(account_index, None)
        .await?;

    Ok(())
}
