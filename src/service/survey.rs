use crate::error::{Error, Result};
use crate::model::{
    api::survey::{SurveyOverview, SurveySpec, SurveyUpdateSpec},
    db::survey::{Survey, SurveyPatch},
    mongodb::Id,
    store::Store,
};

/// Validate a spec and store it as a new survey owned by `owner`.
pub async fn create(store: &dyn Store, owner: &str, spec: SurveySpec) -> Result<Survey> {
    let survey = spec.into_survey(owner)?;
    let survey = store.insert_survey(survey).await?;
    info!("Survey {} created by {owner}", survey.id);
    Ok(survey)
}

/// Get any survey by ID.
pub async fn get(store: &dyn Store, id: Id) -> Result<Survey> {
    store
        .find_survey(id)
        .await?
        .ok_or_else(|| Error::not_found("Survey"))
}

/// All of the owner's surveys, newest first.
pub async fn list_by_owner(store: &dyn Store, owner: &str) -> Result<Vec<Survey>> {
    store.find_surveys_by_owner(owner).await
}

/// Get a survey, checking it belongs to `owner`.
pub async fn get_owned(store: &dyn Store, owner: &str, id: Id) -> Result<Survey> {
    let survey = get(store, id).await?;
    if !survey.is_owned_by(owner) {
        warn!("{owner} attempted to access survey {id} owned by someone else");
        return Err(Error::forbidden("Not authorized"));
    }
    Ok(survey)
}

/// Apply a partial update to one of the owner's surveys.
pub async fn update(
    store: &dyn Store,
    owner: &str,
    id: Id,
    spec: SurveyUpdateSpec,
) -> Result<Survey> {
    get_owned(store, owner, id).await?;
    let patch = SurveyPatch::try_from(spec)?;
    let survey = store
        .update_survey(id, patch)
        .await?
        .ok_or_else(|| Error::not_found("Survey"))?;
    debug!("Survey {id} updated");
    Ok(survey)
}

/// Delete one of the owner's surveys along with its responses.
pub async fn delete(store: &dyn Store, owner: &str, id: Id) -> Result<()> {
    get_owned(store, owner, id).await?;
    if !store.delete_survey(id).await? {
        return Err(Error::not_found("Survey"));
    }
    info!("Survey {id} deleted by {owner}");
    Ok(())
}

/// The owner's surveys with their response counts, newest first.
pub async fn overview(store: &dyn Store, owner: &str) -> Result<Vec<SurveyOverview>> {
    let surveys = list_by_owner(store, owner).await?;
    let mut overview = Vec::with_capacity(surveys.len());
    for survey in surveys {
        let response_count = store.count_responses_by_survey(survey.id).await?;
        overview.push(SurveyOverview {
            survey: survey.into(),
            response_count,
        });
    }
    Ok(overview)
}
