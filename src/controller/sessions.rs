//! Log in and log out

use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::auth::SESSION_COOKIE;
use crate::view;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub(super) async fn new_session() -> Html<String> {
    Html(view::login_page())
}

/// Starts a session when the credentials match. Either way the browser
/// lands back on the index page.
pub(super) async fn create_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> (CookieJar, Redirect) {
    let user = state
        .users
        .find_by_email(&form.email)
        .filter(|user| user.verify_password(&form.password));

    let Some(user) = user else {
        tracing::warn!(email = %form.email, "Log in failed");
        return (jar, Redirect::to("/"));
    };

    let session_id = state.sessions.persist(user.id);
    tracing::info!(user_id = %user.id, "User logged in");
    let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true);
    (jar.add(cookie), Redirect::to("/"))
}

pub(super) async fn destroy_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(session_id): Path<Uuid>,
) -> (CookieJar, Redirect) {
    if state.sessions.clear(session_id) {
        tracing::info!(%session_id, "User logged out");
    }
    (jar.remove(Cookie::build(SESSION_COOKIE).path("/")), Redirect::to("/"))
}
