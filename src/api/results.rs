use std::sync::Arc;

use axum::{
    Extension,
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    api::{error_response, fetch_error_status, html, index::short},
    error::SessionError,
    info,
    server::AppState,
    spotify,
    types::Origin,
    utils, warning,
};

#[derive(Debug, Deserialize)]
pub struct ResultsParams {
    #[serde(default)]
    pub session: String,
}

/// Fetches, sorts and renders the playlist of an authorized session.
///
/// Only browser sessions are served here; terminal sessions stay with the
/// waiting CLI. The session is consumed: reloading the page starts over.
pub async fn results(
    Query(params): Query<ResultsParams>,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    let pending = match state
        .sessions
        .take_authorized(&params.session, Origin::Browser)
        .await
    {
        Ok(pending) => pending,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let Some(token) = pending.token() else {
        return error_response(StatusCode::BAD_REQUEST, &SessionError::NotAuthorized.to_string());
    };

    let playlist = match spotify::playlist::fetch_playlist(
        &state.client,
        &state.settings,
        &token.access_token,
        &pending.playlist_url,
    )
    .await
    {
        Ok(playlist) => playlist,
        Err(e) => {
            warning!("Playlist fetch failed: {}", e);
            return error_response(fetch_error_status(&e), &e.to_string());
        }
    };

    info!(
        "Session {}: '{}' with {} track(s), {} skipped",
        short(&params.session),
        playlist.name,
        playlist.tracks.len(),
        playlist.skipped.len()
    );

    let sorted = utils::sort_tracks(&playlist.tracks, pending.sort_key);
    let rows = utils::to_table(&sorted);
    Html(html::results_page(&playlist, pending.sort_key, &rows)).into_response()
}
