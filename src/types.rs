use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tabled::Tabled;

/// Token endpoint response. Only `access_token` is required by the flow.
#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// OAuth error object, e.g. `{"error": "invalid_grant"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Web API error body: `{"error": {"status": 404, "message": "..."}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One song entry of a playlist, flattened from the Web API payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub name: String,
    pub popularity: u32,
    pub release_date: String,
    pub album: String,
    pub artist: String,
    pub uri: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "Track Name")]
    pub name: String,
    #[tabled(rename = "Artist")]
    pub artist: String,
    #[tabled(rename = "Album")]
    pub album: String,
    #[tabled(rename = "Release Date")]
    pub release_date: String,
    #[tabled(rename = "Popularity Score")]
    pub popularity: u32,
}

impl From<&Track> for TrackTableRow {
    fn from(track: &Track) -> Self {
        TrackTableRow {
            name: track.name.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            release_date: track.release_date.clone(),
            popularity: track.popularity,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistResponse {
    pub name: String,
    pub tracks: PlaylistTracks,
}

/// Items are kept as raw JSON so one malformed entry does not fail the page.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracks {
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<TrackObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackObject {
    pub name: Option<String>,
    pub popularity: Option<u32>,
    pub uri: Option<String>,
    pub album: Option<AlbumObject>,
    #[serde(default)]
    pub artists: Vec<ArtistObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumObject {
    pub name: Option<String>,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistObject {
    pub name: Option<String>,
}

/// A playlist item that could not be turned into a [`Track`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub position: usize,
    pub reason: String,
}

/// Result of one playlist read.
#[derive(Debug, Clone)]
pub struct Playlist {
    pub name: String,
    pub tracks: Vec<Track>,
    pub skipped: Vec<SkippedItem>,
    pub dropped_trailing_item: bool,
}

/// Whether the last item of the response page is read or discarded.
///
/// Older revisions of this tool always discarded it; that behaviour is kept
/// behind `PLAYLIST_DROP_LAST_ITEM` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingItemPolicy {
    #[default]
    KeepAll,
    DropLast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Name,
    Popularity,
    Date,
    Artist,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Name,
        SortKey::Popularity,
        SortKey::Date,
        SortKey::Artist,
    ];

    /// Selector used by the form and the `--by` flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Popularity => "popularity",
            SortKey::Date => "date",
            SortKey::Artist => "artist",
        }
    }

    /// Human-readable name for page and option labels.
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Name => "Track name",
            SortKey::Popularity => "Popularity",
            SortKey::Date => "Release date",
            SortKey::Artist => "Artist",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who started a pending request and therefore how the callback answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Web form; the callback redirects to the results page.
    Browser,
    /// `playsort sort`; the callback stores the token for the waiting CLI.
    Terminal,
}

/// Progress of one session. Stages only move forward:
/// `AwaitingAuthorization -> Exchanging -> Authorized`.
#[derive(Debug, Clone)]
pub enum SessionStage {
    AwaitingAuthorization,
    /// A callback redeemed the `state` and the code exchange is running.
    Exchanging,
    Authorized { token: Token },
}

/// Request-scoped state carried between the form, the callback and the
/// results page.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub playlist_url: String,
    pub sort_key: SortKey,
    pub origin: Origin,
    pub created_at: DateTime<Utc>,
    pub stage: SessionStage,
}

impl PendingRequest {
    pub fn new(playlist_url: String, sort_key: SortKey, origin: Origin) -> Self {
        PendingRequest {
            playlist_url,
            sort_key,
            origin,
            created_at: Utc::now(),
            stage: SessionStage::AwaitingAuthorization,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match &self.stage {
            SessionStage::Authorized { token } => Some(token),
            SessionStage::AwaitingAuthorization | SessionStage::Exchanging => None,
        }
    }
}
