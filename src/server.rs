use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Extension, Router, routing::get};
use reqwest::Client;

use crate::{Res, api, config::Settings, info, management::SessionStore, spotify};

/// Everything a request handler needs; shared by all routes.
pub struct AppState {
    pub settings: Settings,
    pub client: Client,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(settings: Settings, sessions: SessionStore) -> Res<Self> {
        let client = spotify::http_client(settings.request_timeout)?;
        Ok(Self {
            settings,
            client,
            sessions,
        })
    }
}

/// Routes of the web front-end; `state` is handed to every handler as an
/// `Extension`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::index).post(api::submit))
        .route("/home", get(api::index))
        .route("/callback", get(api::callback))
        .route("/results", get(api::results))
        .route("/health", get(api::health))
        .layer(Extension(state))
}

/// Binds `SERVER_ADDRESS` and serves [`router`] until the process exits.
///
/// # Errors
///
/// Returns an error if the address does not parse or cannot be bound.
pub async fn start_api_server(state: Arc<AppState>) -> Res<()> {
    let addr = SocketAddr::from_str(&state.settings.server_addr)
        .map_err(|e| format!("Failed to parse server address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
