use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::{Cookie, SameSite, Status},
    request::{FromRequest, Outcome},
    time::Duration,
    Request,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{api::id::ApiId, db::account::Account, store::DynStore};

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// A signed-in account, decoded from the session cookie and passed explicitly
/// into every handler that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The account's ID.
    pub id: ApiId,
    /// The account's email, which is the identity surveys are owned by.
    #[serde(default)]
    pub email: String,
}

impl Session {
    /// Create a new [`Session`] for the given account.
    pub fn new(account: &Account) -> Self {
        Self {
            id: account.id.into(),
            email: account.email.clone(),
        }
    }

    /// The owner identity of this session, used for all ownership checks.
    pub fn owner(&self) -> Result<&str> {
        if self.email.trim().is_empty() {
            return Err(Error::bad_request("User email not found"));
        }
        Ok(&self.email)
    }

    /// Serialize this session into a cookie.
    pub fn into_cookie(self, config: &Config) -> Result<Cookie<'static>> {
        let claims = Claims {
            session: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;

        Ok(Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .path("/")
            .finish())
    }

    /// Deserialize a session from a cookie.
    pub fn from_cookie(cookie: &Cookie<'_>, config: &Config) -> Result<Self> {
        let session = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims>| claims.claims.session)?;
        Ok(session)
    }
}

/// Cookie claims: the session itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    session: Session,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Session {
    type Error = Error;

    /// Get a [`Session`] from the cookie and check the account still exists.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let (config, store) = match (
            req.rocket().state::<Config>(),
            req.rocket().state::<DynStore>(),
        ) {
            (Some(config), Some(store)) => (config, store),
            _ => {
                return Outcome::Failure((
                    Status::InternalServerError,
                    Error::internal("Session state is not managed"),
                ))
            }
        };

        let not_authenticated = || {
            Outcome::Failure((
                Status::Unauthorized,
                Error::unauthorized("Not authenticated"),
            ))
        };

        let cookie = match req.cookies().get(AUTH_TOKEN_COOKIE) {
            Some(cookie) => cookie,
            None => return not_authenticated(),
        };

        // Expired or tampered tokens are treated as no session at all.
        let session = match Self::from_cookie(cookie, config) {
            Ok(session) => session,
            Err(e) => {
                debug!("Rejected session cookie: {e}");
                return not_authenticated();
            }
        };

        match store.find_account(*session.id).await {
            Ok(Some(_)) => Outcome::Success(session),
            Ok(None) => not_authenticated(),
            Err(e) => Outcome::Failure((Status::InternalServerError, e)),
        }
    }
}
