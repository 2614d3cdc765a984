//! Artist search endpoints

use axum::extract::State;
use axum::response::Html;
use axum::{Form, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::binding::{to_link, wait_until_loaded, Loadable};
use crate::model::{Search, SearchParameters, DEFAULT_SEARCH_PARAMETERS};
use crate::native::ImageSize;
use crate::view;

pub const MAX_ARTISTS: usize = 3;

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtistSummary {
    pub name: String,
    pub uri: String,
    pub portrait: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    pub artists: Vec<ArtistSummary>,
}

pub(super) async fn search_form(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let current = state.current_user(&jar);
    Html(view::search_page(current.as_ref()))
}

pub(super) async fn search_results(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = form.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    tracing::debug!(query, "Performing artist search");
    let parameters = SearchParameters {
        artists: MAX_ARTISTS as i64,
        ..DEFAULT_SEARCH_PARAMETERS
    };
    let search = Search::new(&state.session, query, parameters)?
        .load(Some(state.search_timeout))
        .await?;

    let status = search.status();
    if !status.is_ok() {
        return Err(ApiError::NativeStatus(status));
    }

    let mut artists = Vec::with_capacity(MAX_ARTISTS);
    for artist in search.artists().iter().flatten().take(MAX_ARTISTS) {
        wait_until_loaded(&artist, Some(state.search_timeout)).await?;
        artists.push(ArtistSummary {
            name: artist.name().await?,
            uri: to_link(&artist)?.to_string(),
            portrait: artist.portrait_link(ImageSize::Normal).map(|link| link.to_string()),
        });
    }

    tracing::info!(
        query,
        total = search.artists().total(),
        returned = artists.len(),
        "Search completed successfully"
    );
    Ok(Json(SearchResponse { artists }))
}
