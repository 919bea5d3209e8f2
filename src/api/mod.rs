//! # API Module
//!
//! HTTP endpoints of the playsort web server.
//!
//! ## Flow
//!
//! 1. [`index`] / [`submit`] - `GET /` shows the form, `POST /` validates the
//!    playlist link and sort key, opens a session and redirects to Spotify.
//! 2. [`callback`] - `GET /callback?code&state` exchanges the code for an
//!    access token and attaches it to the session named by `state`.
//! 3. [`results`] - `GET /results?session` reads the playlist, sorts it and
//!    renders the table. The session is consumed.
//!
//! [`health`] answers `GET /health` with the status and version.
//!
//! Each session lives in the [`crate::management::SessionStore`], so two
//! people using the server at the same time never see each other's playlist.
//! Handlers turn every error into an HTML error page: 400 for bad input or
//! unknown sessions, 502 when Spotify fails or times out.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::error::FetchError;

mod callback;
pub mod html;
mod health;
mod index;
mod results;

pub use callback::callback;
pub use health::health;
pub use index::{index, submit};
pub use results::results;

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Html(html::error_page(message))).into_response()
}

pub(crate) fn internal_error(message: &str) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
}

pub(crate) fn fetch_error_status(err: &FetchError) -> StatusCode {
    match err {
        FetchError::InvalidPlaylistUrl(_) => StatusCode::BAD_REQUEST,
        FetchError::Status { status, .. } if *status == StatusCode::NOT_FOUND => {
            StatusCode::NOT_FOUND
        }
        FetchError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}
