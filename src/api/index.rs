use std::sync::Arc;

use axum::{
    Extension, Form,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    api::{html, internal_error},
    info,
    server::AppState,
    spotify,
    types::{Origin, PendingRequest, SortKey},
    utils,
};

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub playlist: String,
    #[serde(default)]
    pub sort: String,
}

pub async fn index() -> Html<String> {
    Html(html::index_page(None, "", SortKey::Popularity))
}

/// Validates the form, opens a session and sends the browser to the
/// consent page.
pub async fn submit(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<SubmitForm>,
) -> Response {
    let sort_key = match utils::parse_sort_key(&form.sort) {
        Ok(key) => key,
        Err(e) => return bad_form(&e.to_string(), &form.playlist, SortKey::Popularity),
    };

    if let Err(e) = spotify::playlist::resolve_playlist_id(&form.playlist) {
        return bad_form(&e.to_string(), &form.playlist, sort_key);
    }

    let request = PendingRequest::new(form.playlist.trim().to_string(), sort_key, Origin::Browser);
    let session_id = state.sessions.create(request).await;

    match spotify::auth::build_authorization_url(&state.settings, &session_id) {
        Ok(url) => {
            info!("Session {} waiting for authorization", short(&session_id));
            Redirect::to(url.as_str()).into_response()
        }
        Err(e) => {
            state.sessions.remove(&session_id).await;
            internal_error(&e.to_string())
        }
    }
}

fn bad_form(message: &str, playlist_url: &str, sort_key: SortKey) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Html(html::index_page(Some(message), playlist_url, sort_key)),
    )
        .into_response()
}

/// First characters of a session id, enough to follow one flow in the log.
pub(crate) fn short(session_id: &str) -> &str {
    session_id.get(..8).unwrap_or(session_id)
}
