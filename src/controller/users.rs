//! Sign up

use axum::extract::State;
use axum::response::{Html, Redirect};
use axum::Form;
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::auth::User;
use crate::view;

#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub(super) async fn new_user() -> Html<String> {
    Html(view::sign_up_page())
}

pub(super) async fn create_user(
    State(state): State<AppState>,
    Form(form): Form<SignUpForm>,
) -> Result<Redirect, ApiError> {
    let user = state.users.insert(User::new(&form.name, &form.email, &form.password)?)?;
    tracing::info!(user_id = %user.id, "User signed up");
    Ok(Redirect::to("/"))
}
