//! Controller module - HTTP handlers for the web front-end
//!
//! The handlers only consume the binding's entities; they never reach into
//! the native library directly. Organized by resource:
//!
//! - `search`: search form and the artist search endpoint
//! - `sessions`: log in and log out
//! - `users`: sign up

mod search;
mod sessions;
mod users;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::{AuthError, LoggedIn, SessionStore, UserStore, SESSION_COOKIE};
use crate::error::HallonError;
use crate::native::ErrorCode;
use crate::session::Session;
use crate::view;

pub use search::{ArtistSummary, SearchResponse, MAX_ARTISTS};

#[derive(Clone)]
pub struct AppState {
    pub session: Session,
    pub users: Arc<dyn UserStore>,
    pub sessions: SessionStore,
    pub search_timeout: Duration,
}

impl AppState {
    /// The logged-in user named by the session cookie, if any.
    pub(crate) fn current_user(&self, jar: &CookieJar) -> Option<LoggedIn> {
        let session_id: Uuid = jar.get(SESSION_COOKIE)?.value().parse().ok()?;
        let user_id = self.sessions.user_for(session_id)?;
        let user = self.users.find(user_id)?;
        Some(LoggedIn { user, session_id })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", get(search::search_form))
        .route("/search_results", post(search::search_results))
        .route("/sessions/new", get(sessions::new_session))
        .route("/sessions", post(sessions::create_session))
        .route("/sessions/:id", delete(sessions::destroy_session))
        .route("/users/new", get(users::new_user))
        .route("/users", post(users::create_user))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let current = state.current_user(&jar);
    Html(view::index_page(current.as_ref()))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Handler failure, rendered as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    Binding(HallonError),
    Auth(AuthError),
    /// The native side loaded the request but reported an error status.
    NativeStatus(ErrorCode),
    BadRequest(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Binding(HallonError::InvalidIdentifier { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Binding(HallonError::Acquisition { .. } | HallonError::LoadFailed(_)) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Binding(HallonError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Binding(HallonError::IndexOutOfRange { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(AuthError::MissingField(_)) => StatusCode::BAD_REQUEST,
            ApiError::Auth(AuthError::EmailTaken(_)) => StatusCode::CONFLICT,
            ApiError::Auth(AuthError::Hash(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NativeStatus(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Binding(e) => e.to_string(),
            ApiError::Auth(e) => e.to_string(),
            ApiError::NativeStatus(code) => format!("search failed: {}", code),
            ApiError::BadRequest(message) => message.clone(),
        }
    }
}

impl From<HallonError> for ApiError {
    fn from(error: HallonError) -> Self {
        ApiError::Binding(error)
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        ApiError::Auth(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %message, "Request rejected");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
