use rocket::{response::status::Created, serde::json::Json, Route};

use crate::{
    api::common::{json_input, JsonInput, Message},
    error::Result,
    model::{
        api::{
            auth::Session,
            response::ResponseDescription,
            results::SurveyResults,
            survey::{SurveyDescription, SurveyOverview, SurveySpec, SurveyUpdateSpec},
        },
        mongodb::Id,
        store::Store,
    },
    service::{response, survey},
};

pub fn routes() -> Vec<Route> {
    routes![
        list_surveys,
        create_survey,
        get_survey,
        update_survey,
        delete_survey,
        survey_responses,
        survey_results,
        dashboard,
    ]
}

#[get("/surveys")]
async fn list_surveys(
    session: Session,
    store: &dyn Store,
) -> Result<Json<Vec<SurveyDescription>>> {
    let surveys = survey::list_by_owner(store, session.owner()?).await?;
    Ok(Json(surveys.into_iter().map(Into::into).collect()))
}

#[post("/surveys", data = "<spec>")]
async fn create_survey(
    session: Session,
    spec: JsonInput<'_, SurveySpec>,
    store: &dyn Store,
) -> Result<Created<Json<SurveyDescription>>> {
    let spec = json_input(spec)?;
    let survey = survey::create(store, session.owner()?, spec).await?;
    let location = uri!(get_survey(survey.id)).to_string();
    Ok(Created::new(location).body(Json(survey.into())))
}

#[get("/surveys/<survey_id>")]
async fn get_survey(survey_id: Id, store: &dyn Store) -> Result<Json<SurveyDescription>> {
    let survey = survey::get(store, survey_id).await?;
    Ok(Json(survey.into()))
}

#[put("/surveys/<survey_id>", data = "<spec>")]
async fn update_survey(
    session: Session,
    survey_id: Id,
    spec: JsonInput<'_, SurveyUpdateSpec>,
    store: &dyn Store,
) -> Result<Json<SurveyDescription>> {
    let owner = session.owner()?;
    // Ownership is checked before the body is parsed.
    survey::get_owned(store, owner, survey_id).await?;
    let spec = json_input(spec)?;
    let survey = survey::update(store, owner, survey_id, spec).await?;
    Ok(Json(survey.into()))
}

#[delete("/surveys/<survey_id>")]
async fn delete_survey(
    session: Session,
    survey_id: Id,
    store: &dyn Store,
) -> Result<Json<Message>> {
    survey::delete(store, session.owner()?, survey_id).await?;
    Ok(Message::new("Survey deleted successfully"))
}

#[get("/surveys/<survey_id>/responses")]
async fn survey_responses(
    session: Session,
    survey_id: Id,
    store: &dyn Store,
) -> Result<Json<Vec<ResponseDescription>>> {
    let responses = response::list_by_survey(store, session.owner()?, survey_id).await?;
    Ok(Json(responses.into_iter().map(Into::into).collect()))
}

#[get("/surveys/<survey_id>/results")]
async fn survey_results(
    session: Session,
    survey_id: Id,
    store: &dyn Store,
) -> Result<Json<SurveyResults>> {
    let results = response::survey_results(store, session.owner()?, survey_id).await?;
    Ok(Json(results))
}

#[get("/dashboard")]
async fn dashboard(session: Session, store: &dyn Store) -> Result<Json<Vec<SurveyOverview>>> {
    Ok(Json(survey::overview(store, session.owner()?).await?))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json::json,
    };

    use crate::model::{
        api::{auth::AccountCredentials, response::ResponseSubmission, results::QuestionResults},
        common::QuestionType,
    };

    use super::*;

    const OWNER: &str = "owner@example.com";

    async fn create(client: &Client, spec: &SurveySpec) -> SurveyDescription {
        let response = client
            .post(uri!(create_survey))
            .header(ContentType::JSON)
            .body(json!(spec).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());
        response.into_json().await.unwrap()
    }

    async fn respond(client: &Client, survey_id: &impl ToString, choice: &str) {
        let submission = ResponseSubmission::example(survey_id.to_string(), choice);
        let response = client
            .post("/responses")
            .header(ContentType::JSON)
            .body(json!(submission).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());
    }

    /// Sign the client in as a second, unrelated account.
    async fn switch_account(client: &Client) {
        let response = client
            .post("/auth/register")
            .header(ContentType::JSON)
            .body(json!(AccountCredentials::example2()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());
    }

    #[backend_test(owner)]
    async fn create_and_get(client: Client) {
        let created = create(&client, &SurveySpec::example()).await;
        assert_eq!(created.title, "Team lunch");
        assert_eq!(created.created_by, OWNER);
        assert_eq!(created.questions.len(), 2);
        assert_eq!(created.questions[0].kind, QuestionType::MultipleChoice);
        assert!(created.questions[1].options.is_empty());

        let response = client
            .get(uri!(get_survey(Id::from(created.id))))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let fetched: SurveyDescription = response.into_json().await.unwrap();
        assert_eq!(fetched, created);
    }

    #[backend_test(owner)]
    async fn create_sets_location(client: Client) {
        let response = client
            .post(uri!(create_survey))
            .header(ContentType::JSON)
            .body(json!(SurveySpec::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());
        let location = response.headers().get_one("Location").unwrap().to_string();
        let created: SurveyDescription = response.into_json().await.unwrap();
        assert_eq!(location, format!("/surveys/{}", created.id));
    }

    #[backend_test(owner)]
    async fn create_invalid(client: Client) {
        // No questions.
        let response = client
            .post(uri!(create_survey))
            .header(ContentType::JSON)
            .body(json!({"title": "T", "description": "D", "questions": []}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        // Multiple choice with only blank options.
        let body = json!({
            "title": "T",
            "description": "D",
            "questions": [{"type": "multipleChoice", "question": "Pick", "options": ["", "  "]}],
        });
        let response = client
            .post(uri!(create_survey))
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        // Not JSON at all.
        let response = client
            .post(uri!(create_survey))
            .header(ContentType::JSON)
            .body("{ not json")
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        let body: rocket::serde::json::Value = response.into_json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[backend_test]
    async fn requires_session(client: Client) {
        let response = client
            .post(uri!(create_survey))
            .header(ContentType::JSON)
            .body(json!(SurveySpec::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
        let body: rocket::serde::json::Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "Not authenticated");

        let response = client.get(uri!(list_surveys)).dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());
        let response = client.get(uri!(dashboard)).dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());
    }

    #[backend_test]
    async fn get_missing(client: Client) {
        let response = client.get(uri!(get_survey(Id::new()))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());

        let response = client.get("/surveys/not-an-id").dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        let body: rocket::serde::json::Value = response.into_json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[backend_test(owner)]
    async fn list_own_surveys(client: Client) {
        let first = create(&client, &SurveySpec::example()).await;
        let second = create(&client, &SurveySpec::example2()).await;

        let response = client.get(uri!(list_surveys)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let listed: Vec<SurveyDescription> = response.into_json().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&first));
        assert!(listed.contains(&second));

        // Someone else sees none of them.
        switch_account(&client).await;
        let response = client.get(uri!(list_surveys)).dispatch().await;
        let listed: Vec<SurveyDescription> = response.into_json().await.unwrap();
        assert!(listed.is_empty());
    }

    #[backend_test(owner)]
    async fn update_by_owner(client: Client) {
        let created = create(&client, &SurveySpec::example()).await;

        let response = client
            .put(uri!(update_survey(Id::from(created.id))))
            .header(ContentType::JSON)
            .body(json!({"title": "Renamed", "createdBy": "someone.else@example.com"}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let updated: SurveyDescription = response.into_json().await.unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.questions, created.questions);
        assert_eq!(updated.created_by, OWNER);
        assert_eq!(updated.created_at, created.created_at);

        let response = client
            .put(uri!(update_survey(Id::from(created.id))))
            .header(ContentType::JSON)
            .body(json!({"description": "   "}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
    }

    #[backend_test(owner)]
    async fn only_owner_may_mutate(client: Client) {
        let created = create(&client, &SurveySpec::example()).await;
        let id = Id::from(created.id);
        switch_account(&client).await;

        let response = client
            .put(uri!(update_survey(id)))
            .header(ContentType::JSON)
            .body(json!({"title": "Mine now"}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());
        let body: rocket::serde::json::Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "Not authorized");

        let response = client.delete(uri!(delete_survey(id))).dispatch().await;
        assert_eq!(Status::Forbidden, response.status());
        let response = client.get(uri!(survey_responses(id))).dispatch().await;
        assert_eq!(Status::Forbidden, response.status());
        let response = client.get(uri!(survey_results(id))).dispatch().await;
        assert_eq!(Status::Forbidden, response.status());

        // Still readable by anyone, and unchanged.
        let response = client.get(uri!(get_survey(id))).dispatch().await;
        let fetched: SurveyDescription = response.into_json().await.unwrap();
        assert_eq!(fetched, created);
    }

    #[backend_test(owner)]
    async fn update_checks_owner_before_body(client: Client) {
        let created = create(&client, &SurveySpec::example()).await;
        let id = Id::from(created.id);

        let response = client
            .put(uri!(update_survey(Id::new())))
            .header(ContentType::JSON)
            .body("{not json")
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());

        switch_account(&client).await;
        let response = client
            .put(uri!(update_survey(id)))
            .header(ContentType::JSON)
            .body("{not json")
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());
    }

    #[backend_test(owner)]
    async fn get_missing_when_signed_in(client: Client) {
        create(&client, &SurveySpec::example()).await;

        let response = client.get(uri!(get_survey(Id::new()))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        let body: rocket::serde::json::Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "Survey not found");

        let response = client.get("/surveys/not-an-id").dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(owner)]
    async fn delete_cascades(client: Client) {
        let created = create(&client, &SurveySpec::example()).await;
        let id = Id::from(created.id);
        respond(&client, &created.id, "A").await;

        let response = client.delete(uri!(delete_survey(id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let body: rocket::serde::json::Value = response.into_json().await.unwrap();
        assert_eq!(body["message"], "Survey deleted successfully");

        let response = client.get(uri!(get_survey(id))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        let response = client.delete(uri!(delete_survey(id))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());

        let store = client.rocket().state::<crate::model::store::DynStore>().unwrap();
        assert_eq!(store.count_responses_by_survey(id).await.unwrap(), 0);
    }

    #[backend_test(owner)]
    async fn responses_and_results(client: Client) {
        let created = create(&client, &SurveySpec::example()).await;
        let id = Id::from(created.id);
        for choice in ["A", "A", "B"] {
            respond(&client, &created.id, choice).await;
        }

        let response = client.get(uri!(survey_responses(id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let responses: Vec<ResponseDescription> = response.into_json().await.unwrap();
        assert_eq!(responses.len(), 3);
        assert!(responses.iter().all(|r| r.survey_id == created.id));
        assert!(responses
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));

        let response = client.get(uri!(survey_results(id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let results: SurveyResults = response.into_json().await.unwrap();
        assert_eq!(results.total_responses, 3);
        match &results.questions[0] {
            QuestionResults::MultipleChoice { options, .. } => {
                let tallies: Vec<_> = options
                    .iter()
                    .map(|o| (o.option.as_str(), o.count, o.percentage))
                    .collect();
                assert_eq!(tallies, vec![("A", 2, 67), ("B", 1, 33)]);
            }
            other => panic!("Expected multiple choice results, got {other:?}"),
        }
        match &results.questions[1] {
            QuestionResults::Text { answers, .. } => assert_eq!(answers.len(), 3),
            other => panic!("Expected text results, got {other:?}"),
        }
    }

    #[backend_test(owner)]
    async fn dashboard_counts(client: Client) {
        let busy = create(&client, &SurveySpec::example()).await;
        let quiet = create(&client, &SurveySpec::example2()).await;
        respond(&client, &busy.id, "B").await;

        let response = client.get(uri!(dashboard)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let overview: Vec<SurveyOverview> = response.into_json().await.unwrap();
        assert_eq!(overview.len(), 2);
        for entry in overview {
            if entry.survey.id == busy.id {
                assert_eq!(entry.response_count, 1);
            } else {
                assert_eq!(entry.survey.id, quiet.id);
                assert_eq!(entry.response_count, 0);
            }
        }
    }
}
