use argon2::Error as Argon2Error;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use mongodb::{bson::ser::Error as BsonError, error::Error as DbError};
use rocket::{http::Status, response::status, serde::json::Json, Request};
use serde::Serialize;
use thiserror::Error;

use crate::logging::RequestId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Bson(#[from] BsonError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::Status(Status::BadRequest, message.into())
    }

    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::Status(Status::Unauthorized, message.into())
    }

    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        Self::Status(Status::Forbidden, message.into())
    }

    /// `"{what} not found"`.
    pub fn not_found<S: AsRef<str>>(what: S) -> Self {
        Self::Status(Status::NotFound, format!("{} not found", what.as_ref()))
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Status(Status::InternalServerError, message.into())
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Db(_) | Self::Bson(_) | Self::Argon2(_) => Status::InternalServerError,
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature
                | JwtErrorKind::ImmatureSignature
                | JwtErrorKind::InvalidSignature
                | JwtErrorKind::InvalidToken => Status::Unauthorized,
                _ => Status::InternalServerError,
            },
            Self::Status(status, _) => *status,
        }
    }
}

/// The JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(error: S) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl<'r, 'o: 'r> rocket::response::Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        let message = if status == Status::InternalServerError {
            // Server-side details stay in the log.
            let id = req.local_cache(RequestId::next);
            error!("req{id} failed: {self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        status::Custom(status, Json(ErrorBody::new(message))).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_statuses() {
        assert_eq!(Error::bad_request("x").status(), Status::BadRequest);
        assert_eq!(Error::unauthorized("x").status(), Status::Unauthorized);
        assert_eq!(Error::forbidden("x").status(), Status::Forbidden);
        assert_eq!(Error::internal("x").status(), Status::InternalServerError);

        let err = Error::not_found("Survey");
        assert_eq!(err.status(), Status::NotFound);
        assert_eq!(err.to_string(), "Survey not found");
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let err: Error = JwtError::from(JwtErrorKind::ExpiredSignature).into();
        assert_eq!(err.status(), Status::Unauthorized);
    }
}
