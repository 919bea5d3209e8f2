use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{
    config::Settings,
    error::FetchError,
    types::{
        ApiErrorResponse, Playlist, PlaylistItem, PlaylistResponse, SkippedItem, Track,
        TrailingItemPolicy,
    },
    warning,
};

pub const PLAYLIST_URL_PREFIX: &str = "https://open.spotify.com/playlist/";
pub const PLAYLIST_URI_PREFIX: &str = "spotify:playlist:";

/// Extracts the playlist id from a share link or a `spotify:playlist:` URI.
///
/// Share links often carry a tracking query (`?si=...`); it is dropped.
///
/// # Errors
///
/// Returns [`FetchError::InvalidPlaylistUrl`] for anything else, including a
/// link without an id.
pub fn resolve_playlist_id(playlist_url: &str) -> Result<String, FetchError> {
    let trimmed = playlist_url.trim();
    let rest = trimmed
        .strip_prefix(PLAYLIST_URL_PREFIX)
        .or_else(|| trimmed.strip_prefix(PLAYLIST_URI_PREFIX))
        .ok_or_else(|| FetchError::InvalidPlaylistUrl(playlist_url.to_string()))?;

    let id = rest
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(FetchError::InvalidPlaylistUrl(playlist_url.to_string()));
    }

    Ok(id.to_string())
}

/// Builds the Web API endpoint for one playlist.
///
/// # Arguments
///
/// * `api_url` - Web API base, e.g. `https://api.spotify.com`; a trailing `/`
///   is ignored
/// * `playlist_id` - Id returned by [`resolve_playlist_id`]
///
/// # Example
///
/// ```
/// let url = playlist_endpoint("https://api.spotify.com/", "37i9dQZF1DXcBWIGoYBM5M");
/// // https://api.spotify.com/v1/playlists/37i9dQZF1DXcBWIGoYBM5M
/// ```
pub fn playlist_endpoint(api_url: &str, playlist_id: &str) -> String {
    format!(
        "{uri}/v1/playlists/{id}",
        uri = api_url.trim_end_matches('/'),
        id = playlist_id
    )
}

/// Reads a playlist's name and the first page of its tracks.
///
/// Issues one `GET /v1/playlists/{id}` with the access token as bearer.
/// Items that cannot be turned into a [`Track`] (removed tracks, local
/// files without artists, podcast episodes with missing fields) are skipped,
/// logged and listed in [`Playlist::skipped`]. Whether the last raw item is
/// read follows `settings.trailing_item_policy`.
///
/// # Errors
///
/// - [`FetchError::InvalidPlaylistUrl`] - the link could not be resolved
/// - [`FetchError::Http`] / [`FetchError::Timeout`] - the request failed
/// - [`FetchError::Status`] - any status other than 200 OK
/// - [`FetchError::MalformedPayload`] - no playlist name or track list
pub async fn fetch_playlist(
    client: &Client,
    settings: &Settings,
    access_token: &str,
    playlist_url: &str,
) -> Result<Playlist, FetchError> {
    let playlist_id = resolve_playlist_id(playlist_url)?;
    let api_url = playlist_endpoint(&settings.api_url, &playlist_id);

    let response = client.get(&api_url).bearer_auth(access_token).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });
        return Err(FetchError::Status { status, message });
    }

    let body = response.text().await?;
    parse_playlist(&body, settings.trailing_item_policy)
}

/// Turns a playlist response body into a [`Playlist`].
pub fn parse_playlist(body: &str, policy: TrailingItemPolicy) -> Result<Playlist, FetchError> {
    let json: PlaylistResponse =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedPayload(e.to_string()))?;

    let mut items = json.tracks.items;
    let dropped_trailing_item = policy == TrailingItemPolicy::DropLast && items.pop().is_some();

    let mut tracks = Vec::with_capacity(items.len());
    let mut skipped = Vec::new();

    for (position, item) in items.into_iter().enumerate() {
        match track_from_item(item) {
            Ok(track) => tracks.push(track),
            Err(reason) => {
                warning!("Skipping playlist item {}: {}", position, reason);
                skipped.push(SkippedItem { position, reason });
            }
        }
    }

    Ok(Playlist {
        name: json.name,
        tracks,
        skipped,
        dropped_trailing_item,
    })
}

fn track_from_item(item: Value) -> Result<Track, String> {
    let item: PlaylistItem = serde_json::from_value(item).map_err(|e| e.to_string())?;
    let track = item.track.ok_or("track is null")?;
    let album = track.album.ok_or("missing album")?;
    let artist = track
        .artists
        .into_iter()
        .next()
        .and_then(|a| a.name)
        .ok_or("missing artist")?;

    Ok(Track {
        name: track.name.ok_or("missing name")?,
        popularity: track.popularity.ok_or("missing popularity")?,
        release_date: album.release_date.ok_or("missing release date")?,
        album: album.name.ok_or("missing album name")?,
        artist,
        uri: track.uri.ok_or("missing uri")?,
    })
}
