use std::sync::Arc;

use axum::{
    Extension,
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    api::{error_response, html, index::short},
    info,
    server::AppState,
    spotify, success,
    types::Origin,
    warning,
};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Receives the provider redirect and exchanges the code for a token.
///
/// Browser sessions continue on `/results`; terminal sessions only record the
/// token for the waiting CLI. Each `state` is redeemed once; any failure after
/// that drops the session.
pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    let Some(session_id) = params.state else {
        return error_response(StatusCode::BAD_REQUEST, "Missing session state.");
    };

    // A `state` is redeemed at most once; replays never reach the provider.
    let pending = match state.sessions.claim(&session_id).await {
        Ok(pending) => pending,
        Err(e) => {
            warning!("Callback for session {} refused: {}", short(&session_id), e);
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    if let Some(error) = params.error {
        state.sessions.remove(&session_id).await;
        warning!("Session {} denied: {}", short(&session_id), error);
        return error_response(
            StatusCode::BAD_REQUEST,
            &format!("Spotify authorization was not granted ({}).", error),
        );
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        state.sessions.remove(&session_id).await;
        return error_response(StatusCode::BAD_REQUEST, "Missing authorization code.");
    };

    let token =
        match spotify::auth::exchange_code_for_token(&state.client, &state.settings, &code).await
        {
            Ok(token) => token,
            Err(e) => {
                state.sessions.remove(&session_id).await;
                warning!("Token exchange failed: {}", e);
                return error_response(
                    StatusCode::BAD_GATEWAY,
                    &format!("Unable to retrieve access token: {}", e),
                );
            }
        };

    if let Err(e) = state.sessions.authorize(&session_id, token).await {
        state.sessions.remove(&session_id).await;
        return error_response(StatusCode::BAD_REQUEST, &e.to_string());
    }

    success!("Session {} authorized", short(&session_id));

    match pending.origin {
        Origin::Browser => {
            Redirect::to(&format!("/results?session={}", session_id)).into_response()
        }
        Origin::Terminal => {
            info!("Handing token over to the terminal");
            Html(html::terminal_done_page()).into_response()
        }
    }
}
