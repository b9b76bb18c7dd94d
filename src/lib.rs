#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, StoreFairing};
use crate::logging::LoggerFairing;

mod api;
pub mod config;
pub mod error;
mod logging;
pub mod model;
pub mod service;

/// Build the server from `Rocket.toml` and the environment.
pub fn build() -> Rocket<Build> {
    assemble(rocket::build())
}

fn assemble(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(StoreFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
}

/// Configuration for a server on a fresh in-memory store, with a fixed test secret.
#[cfg(test)]
fn test_figment() -> rocket::figment::Figment {
    rocket::Config::figment()
        .merge(("store", "memory"))
        .merge(("auth_ttl", 3600))
        .merge(("jwt_secret", "jwt secret for tests"))
}

/// Build a server on a fresh in-memory store, with a fixed test secret.
#[cfg(test)]
pub(crate) fn build_for_tests() -> Rocket<Build> {
    assemble(rocket::custom(test_figment()))
}

#[cfg(test)]
mod tests {
    use rocket::Config;

    use super::*;

    #[rocket::async_test]
    async fn release_ignites_without_secret_key() {
        let figment = test_figment().select(Config::RELEASE_PROFILE);
        let rocket = assemble(rocket::custom(figment)).ignite().await;
        assert!(rocket.is_ok(), "{:?}", rocket.err());
    }
}
