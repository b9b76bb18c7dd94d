use argon2::Config as Argon2Config;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    api::id::ApiId,
    db::account::{Account, NewAccount},
};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Raw account credentials, received from a user. These are never stored directly,
/// since the password is in plaintext.
#[derive(Clone, Deserialize, Serialize)]
pub struct AccountCredentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl AccountCredentials {
    /// The email in the form accounts are stored and surveys are owned under.
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }
}

/// Trim and lower-case an email address.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl TryFrom<AccountCredentials> for NewAccount {
    type Error = Error;

    /// Convert [`AccountCredentials`] to a new account by hashing the password.
    /// This enforces a plausible email and the minimum password length.
    fn try_from(cred: AccountCredentials) -> Result<Self> {
        let email = cred.normalized_email();
        let plausible = email
            .split_once('@')
            .map(|(user, domain)| !user.is_empty() && !domain.is_empty())
            .unwrap_or(false);
        if !plausible {
            return Err(Error::bad_request("A valid email address is required"));
        }
        if cred.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::bad_request(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        // 16 bytes is recommended for password hashing:
        //  https://en.wikipedia.org/wiki/Argon2
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(cred.password.as_bytes(), &salt, &Argon2Config::default())?;
        Ok(Self {
            email,
            password_hash,
            created_at: Utc::now(),
        })
    }
}

/// The public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDescription {
    pub id: ApiId,
    pub email: String,
}

impl From<&Account> for AccountDescription {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.into(),
            email: account.email.clone(),
        }
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl AccountCredentials {
        pub fn example1() -> Self {
            Self {
                email: "owner@example.com".into(),
                password: "surveys4lyfe".into(),
            }
        }

        pub fn example2() -> Self {
            Self {
                email: "someone.else@example.com".into(),
                password: "totallysecurepassword".into(),
            }
        }

        pub fn empty() -> Self {
            Self {
                email: "".into(),
                password: "".into(),
            }
        }
    }
}
