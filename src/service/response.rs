use crate::error::{Error, Result};
use crate::model::{
    api::{response::ResponseSubmission, results::SurveyResults},
    db::response::Response,
    mongodb::Id,
    store::Store,
};

use super::{results, survey};

/// Check a submission against its survey and store it.
///
/// Anyone may respond. Nothing is written unless the survey exists and the
/// answers fit it.
pub async fn submit(store: &dyn Store, submission: ResponseSubmission) -> Result<Response> {
    // A malformed ID can't name any survey.
    let survey_id = submission
        .required_survey_id()?
        .parse::<Id>()
        .map_err(|_| Error::not_found("Survey"))?;
    let survey = survey::get(store, survey_id).await?;

    let response = submission.into_response(&survey)?;
    let response = store.insert_response(response).await?;
    info!("Response {} stored for survey {survey_id}", response.id);
    Ok(response)
}

/// All responses to one of the owner's surveys, newest first.
pub async fn list_by_survey(
    store: &dyn Store,
    owner: &str,
    survey_id: Id,
) -> Result<Vec<Response>> {
    survey::get_owned(store, owner, survey_id).await?;
    store.find_responses_by_survey(survey_id).await
}

/// How many responses a survey has.
pub async fn count_by_survey(store: &dyn Store, survey_id: Id) -> Result<u64> {
    store.count_responses_by_survey(survey_id).await
}

/// Aggregated results of one of the owner's surveys.
pub async fn survey_results(
    store: &dyn Store,
    owner: &str,
    survey_id: Id,
) -> Result<SurveyResults> {
    let survey = survey::get_owned(store, owner, survey_id).await?;
    let responses = store.find_responses_by_survey(survey_id).await?;
    Ok(results::summarize(&survey, &responses))
}
