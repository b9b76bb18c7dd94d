use rocket::{http::Status, response::status::Custom, serde::json::Json, Route};

use crate::{
    api::common::{json_input, JsonInput},
    error::Result,
    model::{
        api::response::{ResponseDescription, ResponseSubmission},
        store::Store,
    },
    service::response,
};

pub fn routes() -> Vec<Route> {
    routes![submit_response]
}

/// Anyone with the link may respond; no session is needed.
#[post("/responses", data = "<submission>")]
async fn submit_response(
    submission: JsonInput<'_, ResponseSubmission>,
    store: &dyn Store,
) -> Result<Custom<Json<ResponseDescription>>> {
    let submission = json_input(submission)?;
    let response = response::submit(store, submission).await?;
    Ok(Custom(Status::Created, Json(response.into())))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::ContentType,
        local::asynchronous::Client,
        serde::json::{serde_json::json, Value},
    };

    use crate::model::{
        api::survey::SurveySpec, common::Answer, db::survey::NewSurvey, mongodb::Id,
        store::DynStore,
    };

    use super::*;

    /// Put a survey straight into the store.
    async fn seed_survey(client: &Client) -> Id {
        let store = client.rocket().state::<DynStore>().unwrap();
        let survey = SurveySpec::example()
            .into_survey("owner@example.com")
            .unwrap();
        store.insert_survey(survey).await.unwrap().id
    }

    #[backend_test]
    async fn anonymous_submission(client: Client) {
        let survey_id = seed_survey(&client).await;

        let response = client
            .post(uri!(submit_response))
            .header(ContentType::JSON)
            .body(json!(ResponseSubmission::example(survey_id, "A")).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());

        let echoed: ResponseDescription = response.into_json().await.unwrap();
        assert_eq!(Id::from(echoed.survey_id), survey_id);
        assert_eq!(echoed.answers.len(), 2);
        assert_eq!(echoed.respondent_email, None);
    }

    #[backend_test]
    async fn identified_submission(client: Client) {
        let survey_id = seed_survey(&client).await;
        let mut submission = ResponseSubmission::example(survey_id, "B");
        submission.respondent_email = Some("respondent@example.com".to_string());

        let response = client
            .post(uri!(submit_response))
            .header(ContentType::JSON)
            .body(json!(submission).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());
        let echoed: Value = response.into_json().await.unwrap();
        assert_eq!(echoed["respondentEmail"], "respondent@example.com");
        assert!(echoed["id"].is_string());
        assert!(echoed["createdAt"].is_string());
    }

    #[backend_test]
    async fn missing_survey(client: Client) {
        let missing = Id::new();
        let response = client
            .post(uri!(submit_response))
            .header(ContentType::JSON)
            .body(json!(ResponseSubmission::example(missing, "A")).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "Survey not found");

        let store = client.rocket().state::<DynStore>().unwrap();
        assert_eq!(store.count_responses_by_survey(missing).await.unwrap(), 0);
    }

    #[backend_test]
    async fn invalid_submissions(client: Client) {
        let survey_id = seed_survey(&client).await;

        // Missing fields.
        let response = client
            .post(uri!(submit_response))
            .header(ContentType::JSON)
            .body(json!({"surveyId": survey_id.to_string()}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "Missing required fields: surveyId, answers");

        // Unknown question.
        let body = json!({
            "surveyId": survey_id.to_string(),
            "answers": [{"questionId": "q-unknown", "answer": "A"}],
        });
        let response = client
            .post(uri!(submit_response))
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        // Malformed body.
        let response = client
            .post(uri!(submit_response))
            .header(ContentType::JSON)
            .body("[")
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        let store = client.rocket().state::<DynStore>().unwrap();
        assert_eq!(store.count_responses_by_survey(survey_id).await.unwrap(), 0);
    }

    #[backend_test]
    async fn multi_select_accepted(client: Client) {
        let survey_id = seed_survey(&client).await;
        let body = json!({
            "surveyId": survey_id.to_string(),
            "answers": [{"questionId": "q-choice", "answer": ["A", "B"]}],
        });
        let response = client
            .post(uri!(submit_response))
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Created, response.status());

        let store = client.rocket().state::<DynStore>().unwrap();
        let stored = store.find_responses_by_survey(survey_id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(
            stored[0].answers,
            vec![Answer::multiple("q-choice", &["A", "B"])]
        );
    }

    #[test]
    fn seeded_survey_has_example_questions() {
        let survey: NewSurvey = SurveySpec::example().into_survey("x@example.com").unwrap();
        assert!(survey.question("q-choice").is_some());
        assert!(survey.question("q-text").is_some());
    }
}
