mod credentials;
mod session;

pub use credentials::{AccountCredentials, AccountDescription};
pub use session::{Session, AUTH_TOKEN_COOKIE};
