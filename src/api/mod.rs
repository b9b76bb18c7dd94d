use rocket::{Catcher, Route};

mod auth;
mod common;
mod responses;
mod surveys;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(surveys::routes());
    routes.extend(responses::routes());
    routes
}

/// Catchers rendering every error status as a JSON body.
pub fn catchers() -> Vec<Catcher> {
    catchers![
        common::bad_request,
        common::unauthorized,
        common::not_found,
        common::internal_error,
        common::default,
    ]
}
