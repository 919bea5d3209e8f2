use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config::Settings,
    error, info,
    management::SessionStore,
    server::{AppState, start_api_server},
    spotify, success,
    types::{Origin, PendingRequest, SortKey, Token},
    utils, warning,
};

/// How long the terminal waits for the user to finish the consent page.
const AUTH_WAIT: Duration = Duration::from_secs(120);
const AUTH_POLL: Duration = Duration::from_millis(500);

/// Runs the whole flow from the terminal and prints the sorted table.
///
/// Starts the callback server in the background, opens the consent page in
/// the default browser and waits until the callback has attached a token to
/// this run's session. `SPOTIFY_API_REDIRECT_URI` must point at
/// `SERVER_ADDRESS`'s `/callback`.
pub async fn sort(settings: Settings, playlist_url: String, sort_key: SortKey) {
    if let Err(e) = spotify::playlist::resolve_playlist_id(&playlist_url) {
        error!("{}", e);
    }

    let sessions = SessionStore::new();
    let state = match AppState::new(settings, sessions.clone()) {
        Ok(state) => Arc::new(state),
        Err(e) => error!("Cannot create HTTP client: {}", e),
    };

    let server_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = start_api_server(server_state).await {
            error!("Callback server stopped: {}", e);
        }
    });

    let session_id = sessions
        .create(PendingRequest::new(
            playlist_url.clone(),
            sort_key,
            Origin::Terminal,
        ))
        .await;

    let auth_url = match spotify::auth::build_authorization_url(&state.settings, &session_id) {
        Ok(url) => url,
        Err(e) => error!("{}", e),
    };

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let Some(token) = wait_for_token(&sessions, &session_id).await else {
        sessions.remove(&session_id).await;
        error!("Authorization failed or timed out.");
    };
    sessions.remove(&session_id).await;
    success!("Authorization successful!");

    let pb = spinner("Fetching playlist...");
    let result = spotify::playlist::fetch_playlist(
        &state.client,
        &state.settings,
        &token.access_token,
        &playlist_url,
    )
    .await;
    pb.finish_and_clear();

    let playlist = match result {
        Ok(playlist) => playlist,
        Err(e) => error!("Cannot fetch playlist: {}", e),
    };

    let sorted = utils::sort_tracks(&playlist.tracks, sort_key);
    let table = Table::new(utils::to_table_rows(&sorted));
    println!(
        "Playlist: {name}\tSorted by: {key}\n{table}\n",
        name = playlist.name,
        key = sort_key,
        table = table
    );

    if !playlist.skipped.is_empty() {
        warning!(
            "{} playlist item(s) could not be read and were left out",
            playlist.skipped.len()
        );
    }
    if playlist.dropped_trailing_item {
        info!("The last playlist item was left out (PLAYLIST_DROP_LAST_ITEM)");
    }
}

/// Waits with a spinner until the callback stored a token or [`AUTH_WAIT`]
/// elapsed.
async fn wait_for_token(sessions: &SessionStore, session_id: &str) -> Option<Token> {
    let pb = spinner("Waiting for authorization in the browser...");
    let token = sessions
        .wait_for_token(session_id, AUTH_WAIT, AUTH_POLL)
        .await;
    pb.finish_and_clear();
    token
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
