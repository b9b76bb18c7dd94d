use rocket::{
    http::{Cookie, CookieJar},
    response::status::Created,
    serde::json::Json,
    Route, State,
};

use crate::{
    api::common::{json_input, JsonInput, Message},
    config::Config,
    error::{Error, Result},
    model::{
        api::auth::{AccountCredentials, AccountDescription, Session, AUTH_TOKEN_COOKIE},
        db::account::NewAccount,
        store::Store,
    },
};

pub fn routes() -> Vec<Route> {
    routes![register, login, logout, me]
}

#[post("/auth/register", data = "<credentials>")]
pub async fn register(
    cookies: &CookieJar<'_>,
    credentials: JsonInput<'_, AccountCredentials>,
    store: &dyn Store,
    config: &State<Config>,
) -> Result<Created<Json<AccountDescription>>> {
    let account: NewAccount = json_input(credentials)?.try_into()?;
    let account = store
        .insert_account(account)
        .await?
        .ok_or_else(|| Error::bad_request("Email already registered"))?;
    info!("Account {} registered", account.id);

    cookies.add(Session::new(&account).into_cookie(config)?);
    Ok(Created::new(uri!(me).to_string()).body(Json(AccountDescription::from(&account))))
}

#[post("/auth/login", data = "<credentials>")]
pub async fn login(
    cookies: &CookieJar<'_>,
    credentials: JsonInput<'_, AccountCredentials>,
    store: &dyn Store,
    config: &State<Config>,
) -> Result<Json<AccountDescription>> {
    let credentials = json_input(credentials)?;
    let account = store
        .find_account_by_email(&credentials.normalized_email())
        .await?
        .filter(|account| account.verify_password(&credentials.password))
        .ok_or_else(|| Error::unauthorized("Invalid email or password"))?;

    cookies.add(Session::new(&account).into_cookie(config)?);
    Ok(Json(AccountDescription::from(&account)))
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar<'_>) -> Json<Message> {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Message::new("Signed out")
}

#[get("/auth/me")]
pub async fn me(session: Session, store: &dyn Store) -> Result<Json<AccountDescription>> {
    let account = store
        .find_account(*session.id)
        .await?
        .ok_or_else(|| Error::unauthorized("Not authenticated"))?;
    Ok(Json(AccountDescription::from(&account)))
}
