use std::sync::Arc;

use crate::{
    config::Settings,
    error, info,
    management::SessionStore,
    server::{AppState, start_api_server},
};

pub async fn serve(settings: Settings) {
    let state = match AppState::new(settings, SessionStore::new()) {
        Ok(state) => Arc::new(state),
        Err(e) => error!("Cannot create HTTP client: {}", e),
    };

    info!("Spotify will redirect to {}", state.settings.redirect_uri);

    if let Err(e) = start_api_server(state).await {
        error!("Server stopped: {}", e);
    }
}
