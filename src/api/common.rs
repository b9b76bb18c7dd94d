use rocket::{
    http::Status,
    response::status,
    serde::json::{self, Json},
    Request,
};
use serde::Serialize;

use crate::error::{Error, ErrorBody, Result};

/// A JSON request body that may have failed to parse.
/// See [`json_input`].
pub type JsonInput<'r, T> = std::result::Result<Json<T>, json::Error<'r>>;

/// Unwrap a JSON request body, turning a parse failure into a 400.
pub fn json_input<T>(input: JsonInput<'_, T>) -> Result<T> {
    match input {
        Ok(Json(value)) => Ok(value),
        Err(json::Error::Io(e)) => Err(Error::bad_request(format!(
            "Could not read request body: {e}"
        ))),
        Err(json::Error::Parse(_, e)) => Err(Error::bad_request(format!("Invalid JSON: {e}"))),
    }
}

/// A plain confirmation message.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

impl Message {
    pub fn new(message: &'static str) -> Json<Self> {
        Json(Self { message })
    }
}

/// The JSON error body sent by every catcher.
fn error_body(status: Status, message: &str) -> status::Custom<Json<ErrorBody>> {
    status::Custom(status, Json(ErrorBody::new(message)))
}

#[catch(400)]
pub fn bad_request() -> status::Custom<Json<ErrorBody>> {
    error_body(Status::BadRequest, "Bad request")
}

#[catch(401)]
pub fn unauthorized() -> status::Custom<Json<ErrorBody>> {
    error_body(Status::Unauthorized, "Not authenticated")
}

#[catch(404)]
pub fn not_found() -> status::Custom<Json<ErrorBody>> {
    error_body(Status::NotFound, "Not found")
}

#[catch(500)]
pub fn internal_error() -> status::Custom<Json<ErrorBody>> {
    error_body(Status::InternalServerError, "Internal server error")
}

#[catch(default)]
pub fn default(status: Status, _req: &Request) -> status::Custom<Json<ErrorBody>> {
    error_body(status, status.reason().unwrap_or("Unknown error"))
}
